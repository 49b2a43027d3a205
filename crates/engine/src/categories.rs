//! The module contains the `Category` struct and its entity.
//!
//! Categories form a two-level tree: a category may have a parent, but a
//! category that has a parent can never become one.

use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Debug, PartialEq)]
pub struct Category {
    pub id: Uuid,
    pub budget_id: Uuid,
    pub name: String,
    pub parent_id: Option<Uuid>,
    pub is_archived: bool,
    pub sort_order: i32,
}

impl Category {
    pub fn new(budget_id: Uuid, name: String, parent_id: Option<Uuid>, sort_order: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            budget_id,
            name,
            parent_id,
            is_archived: false,
            sort_order,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub budget_id: String,
    pub name: String,
    pub parent_id: Option<String>,
    pub is_archived: bool,
    pub sort_order: i32,
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
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentId",
        to = "Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Parent,
}

impl Related<super::budgets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budgets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Category> for ActiveModel {
    fn from(value: &Category) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            budget_id: ActiveValue::Set(value.budget_id.to_string()),
            name: ActiveValue::Set(value.name.clone()),
            parent_id: ActiveValue::Set(value.parent_id.map(|id| id.to_string())),
            is_archived: ActiveValue::Set(value.is_archived),
            sort_order: ActiveValue::Set(value.sort_order),
        }
    }
}

impl TryFrom<Model> for Category {
    type Error = EngineError;

    fn try_from(value: Model) -> ResultEngine<Self> {
        let id = Uuid::parse_str(&value.id)
            .map_err(|_| EngineError::CategoryNotFound(value.id.clone()))?;
        let budget_id = Uuid::parse_str(&value.budget_id)
            .map_err(|_| EngineError::BudgetNotFound(value.budget_id.clone()))?;
        let parent_id = match &value.parent_id {
            Some(raw) => Some(
                Uuid::parse_str(raw).map_err(|_| EngineError::CategoryNotFound(raw.clone()))?,
            ),
            None => None,
        };

        Ok(Category {
            id,
            budget_id,
            name: value.name,
            parent_id,
            is_archived: value.is_archived,
            sort_order: value.sort_order,
        })
    }
}
