//! The module contains the `TransactionLine` struct and its entity.

use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// One balance change within a transaction.
///
/// Amounts are signed minor units: negative leaves the account, positive
/// enters it. Never zero.
#[derive(Clone, Debug, PartialEq)]
pub struct TransactionLine {
    pub id: Uuid,
    pub account_id: Uuid,
    pub category_id: Option<Uuid>,
    pub payee_id: Option<Uuid>,
    pub amount_minor: i64,
    pub memo: Option<String>,
    /// Deduplicated, insertion-ordered.
    pub tag_ids: Vec<Uuid>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transaction_lines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub transaction_id: String,
    pub account_id: String,
    pub category_id: Option<String>,
    pub payee_id: Option<String>,
    pub amount_minor: i64,
    pub memo: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::transactions::Entity",
        from = "Column::TransactionId",
        to = "super::transactions::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Transactions,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Accounts,
    #[sea_orm(has_many = "super::line_tags::Entity")]
    LineTags,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl Related<super::line_tags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LineTags.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TransactionLine {
    pub(crate) fn to_active_model(&self, transaction_id: Uuid) -> ActiveModel {
        ActiveModel {
            id: ActiveValue::Set(self.id.to_string()),
            transaction_id: ActiveValue::Set(transaction_id.to_string()),
            account_id: ActiveValue::Set(self.account_id.to_string()),
            category_id: ActiveValue::Set(self.category_id.map(|id| id.to_string())),
            payee_id: ActiveValue::Set(self.payee_id.map(|id| id.to_string())),
            amount_minor: ActiveValue::Set(self.amount_minor),
            memo: ActiveValue::Set(self.memo.clone()),
        }
    }
}

impl Model {
    pub(crate) fn into_line(self, tag_ids: Vec<Uuid>) -> ResultEngine<TransactionLine> {
        let id =
            Uuid::parse_str(&self.id).map_err(|_| EngineError::LineNotFound(self.id.clone()))?;
        let account_id = Uuid::parse_str(&self.account_id)
            .map_err(|_| EngineError::AccountNotFound(self.account_id.clone()))?;
        let category_id = match &self.category_id {
            Some(raw) => Some(
                Uuid::parse_str(raw).map_err(|_| EngineError::CategoryNotFound(raw.clone()))?,
            ),
            None => None,
        };
        let payee_id = match &self.payee_id {
            Some(raw) => {
                Some(Uuid::parse_str(raw).map_err(|_| EngineError::PayeeNotFound(raw.clone()))?)
            }
            None => None,
        };

        Ok(TransactionLine {
            id,
            account_id,
            category_id,
            payee_id,
            amount_minor: self.amount_minor,
            memo: self.memo,
            tag_ids,
        })
    }
}
