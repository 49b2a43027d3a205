//! The module contains the `Tag` struct and its entity.

use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Debug, PartialEq)]
pub struct Tag {
    pub id: Uuid,
    pub budget_id: Uuid,
    pub name: String,
}

impl Tag {
    pub fn new(budget_id: Uuid, name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            budget_id,
            name,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "tags")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub budget_id: String,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::budgets::Entity",
        from = "Column::BudgetId",
        to = "super::budgets::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Budgets,
    #[sea_orm(has_many = "super::line_tags::Entity")]
    LineTags,
}

impl Related<super::budgets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budgets.def()
    }
}

impl Related<super::line_tags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LineTags.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Tag> for ActiveModel {
    fn from(value: &Tag) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            budget_id: ActiveValue::Set(value.budget_id.to_string()),
            name: ActiveValue::Set(value.name.clone()),
        }
    }
}

impl TryFrom<Model> for Tag {
    type Error = EngineError;

    fn try_from(value: Model) -> ResultEngine<Self> {
        let id =
            Uuid::parse_str(&value.id).map_err(|_| EngineError::TagNotFound(value.id.clone()))?;
        let budget_id = Uuid::parse_str(&value.budget_id)
            .map_err(|_| EngineError::BudgetNotFound(value.budget_id.clone()))?;

        Ok(Tag {
            id,
            budget_id,
            name: value.name,
        })
    }
}
