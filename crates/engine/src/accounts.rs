//! The module contains the `Account` struct and its entity.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// What kind of real-world account this row represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccountType {
    Checking,
    Savings,
    CreditCard,
    Cash,
    Loan,
    Investment,
    Asset,
    Liability,
}

impl AccountType {
    /// Canonical string stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Checking => "checking",
            Self::Savings => "savings",
            Self::CreditCard => "credit_card",
            Self::Cash => "cash",
            Self::Loan => "loan",
            Self::Investment => "investment",
            Self::Asset => "asset",
            Self::Liability => "liability",
        }
    }
}

impl TryFrom<&str> for AccountType {
    type Error = EngineError;

    fn try_from(value: &str) -> ResultEngine<Self> {
        match value {
            "checking" => Ok(Self::Checking),
            "savings" => Ok(Self::Savings),
            "credit_card" => Ok(Self::CreditCard),
            "cash" => Ok(Self::Cash),
            "loan" => Ok(Self::Loan),
            "investment" => Ok(Self::Investment),
            "asset" => Ok(Self::Asset),
            "liability" => Ok(Self::Liability),
            other => Err(EngineError::InvalidAccountType(other.to_string())),
        }
    }
}

/// An account: a place money sits or a liability it owes against.
#[derive(Clone, Debug, PartialEq)]
pub struct Account {
    pub id: Uuid,
    pub budget_id: Uuid,
    pub name: String,
    pub account_type: AccountType,
    /// Always equal to the owning budget's base currency.
    pub currency_code: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(
        budget_id: Uuid,
        name: String,
        account_type: AccountType,
        currency_code: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            budget_id,
            name,
            account_type,
            currency_code,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub budget_id: String,
    pub name: String,
    pub account_type: String,
    pub currency_code: String,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
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
    #[sea_orm(has_many = "super::transaction_lines::Entity")]
    Lines,
}

impl Related<super::budgets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budgets.def()
    }
}

impl Related<super::transaction_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Account> for ActiveModel {
    fn from(value: &Account) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            budget_id: ActiveValue::Set(value.budget_id.to_string()),
            name: ActiveValue::Set(value.name.clone()),
            account_type: ActiveValue::Set(value.account_type.as_str().to_string()),
            currency_code: ActiveValue::Set(value.currency_code.clone()),
            is_active: ActiveValue::Set(value.is_active),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for Account {
    type Error = EngineError;

    fn try_from(value: Model) -> ResultEngine<Self> {
        let id = Uuid::parse_str(&value.id)
            .map_err(|_| EngineError::AccountNotFound(value.id.clone()))?;
        let budget_id = Uuid::parse_str(&value.budget_id)
            .map_err(|_| EngineError::BudgetNotFound(value.budget_id.clone()))?;
        let account_type = AccountType::try_from(value.account_type.as_str())?;

        Ok(Account {
            id,
            budget_id,
            name: value.name,
            account_type,
            currency_code: value.currency_code,
            is_active: value.is_active,
            created_at: value.created_at,
        })
    }
}
