//! The module contains the `Budget` struct and its entity.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// A budget.
///
/// The tenancy unit: every account, category, payee, tag and transaction
/// belongs to exactly one budget, and only members may touch them.
#[derive(Clone, Debug, PartialEq)]
pub struct Budget {
    pub id: Uuid,
    pub name: String,
    /// Uppercase code into the currencies reference table.
    pub base_currency_code: String,
    pub owner_user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Budget {
    pub fn new(name: String, base_currency_code: String, owner_user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            base_currency_code,
            owner_user_id,
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub base_currency_code: String,
    pub owner_user_id: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::accounts::Entity")]
    Accounts,
    #[sea_orm(has_many = "super::budget_members::Entity")]
    Members,
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl Related<super::budget_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Budget> for ActiveModel {
    fn from(value: &Budget) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            name: ActiveValue::Set(value.name.clone()),
            base_currency_code: ActiveValue::Set(value.base_currency_code.clone()),
            owner_user_id: ActiveValue::Set(value.owner_user_id.to_string()),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for Budget {
    type Error = EngineError;

    fn try_from(value: Model) -> ResultEngine<Self> {
        let id = Uuid::parse_str(&value.id)
            .map_err(|_| EngineError::BudgetNotFound(value.id.clone()))?;
        let owner_user_id = Uuid::parse_str(&value.owner_user_id)
            .map_err(|_| EngineError::UserNotFound(value.owner_user_id.clone()))?;

        Ok(Budget {
            id,
            name: value.name,
            base_currency_code: value.base_currency_code,
            owner_user_id,
            created_at: value.created_at,
        })
    }
}
