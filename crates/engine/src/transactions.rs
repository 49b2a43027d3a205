//! The module contains the `Transaction` header struct and its entity.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, transaction_lines::TransactionLine};

/// Lifecycle status of a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionStatus {
    Pending,
    Posted,
    Reconciled,
    Void,
}

impl TransactionStatus {
    /// Canonical string stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Posted => "posted",
            Self::Reconciled => "reconciled",
            Self::Void => "void",
        }
    }
}

impl TryFrom<&str> for TransactionStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> ResultEngine<Self> {
        match value {
            "pending" => Ok(Self::Pending),
            "posted" => Ok(Self::Posted),
            "reconciled" => Ok(Self::Reconciled),
            "void" => Ok(Self::Void),
            other => Err(EngineError::InvalidStatus(other.to_string())),
        }
    }
}

/// A transaction header with its hydrated lines.
///
/// Lines keep insertion order; they are either a balanced two-line
/// transfer or a single-account split, never anything else.
#[derive(Clone, Debug, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    pub budget_id: Uuid,
    pub posted_at: DateTime<Utc>,
    pub status: TransactionStatus,
    pub notes: Option<String>,
    /// External dedup key, unique per budget, immutable once set.
    pub import_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<TransactionLine>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub budget_id: String,
    pub posted_at: DateTimeUtc,
    pub status: String,
    pub notes: Option<String>,
    pub import_id: Option<String>,
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

impl From<&Transaction> for ActiveModel {
    fn from(value: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            budget_id: ActiveValue::Set(value.budget_id.to_string()),
            posted_at: ActiveValue::Set(value.posted_at),
            status: ActiveValue::Set(value.status.as_str().to_string()),
            notes: ActiveValue::Set(value.notes.clone()),
            import_id: ActiveValue::Set(value.import_id.clone()),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl Model {
    /// Build the domain header from a row plus its already-hydrated lines.
    pub(crate) fn into_transaction(self, lines: Vec<TransactionLine>) -> ResultEngine<Transaction> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|_| EngineError::TransactionNotFound(self.id.clone()))?;
        let budget_id = Uuid::parse_str(&self.budget_id)
            .map_err(|_| EngineError::BudgetNotFound(self.budget_id.clone()))?;
        let status = TransactionStatus::try_from(self.status.as_str())?;

        Ok(Transaction {
            id,
            budget_id,
            posted_at: self.posted_at,
            status,
            notes: self.notes,
            import_id: self.import_id,
            created_at: self.created_at,
            lines,
        })
    }
}
