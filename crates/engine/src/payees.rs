//! The module contains the `Payee` struct and its entity.

use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Debug, PartialEq)]
pub struct Payee {
    pub id: Uuid,
    pub budget_id: Uuid,
    pub name: String,
}

impl Payee {
    pub fn new(budget_id: Uuid, name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            budget_id,
            name,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "payees")]
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
}

impl Related<super::budgets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budgets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Payee> for ActiveModel {
    fn from(value: &Payee) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            budget_id: ActiveValue::Set(value.budget_id.to_string()),
            name: ActiveValue::Set(value.name.clone()),
        }
    }
}

impl TryFrom<Model> for Payee {
    type Error = EngineError;

    fn try_from(value: Model) -> ResultEngine<Self> {
        let id =
            Uuid::parse_str(&value.id).map_err(|_| EngineError::PayeeNotFound(value.id.clone()))?;
        let budget_id = Uuid::parse_str(&value.budget_id)
            .map_err(|_| EngineError::BudgetNotFound(value.budget_id.clone()))?;

        Ok(Payee {
            id,
            budget_id,
            name: value.name,
        })
    }
}
