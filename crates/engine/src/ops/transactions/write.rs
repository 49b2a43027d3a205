mod create;
mod delete;
mod split;
mod transfer;
mod update;

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, prelude::*};

use crate::{
    EngineError, NewLine, ResultEngine, Transaction, TransactionLine, line_tags, transaction_lines,
    transactions,
};

use super::super::lines::LineCheckCache;
use super::helpers::{LineSnapshot, normalize_status, require_valid_shape};
use super::super::{Engine, normalize_optional_text};

/// Everything create, transfer and bulk import share: header fields plus
/// the fully-specified new lines.
pub(in crate::ops) struct TransactionBuildInput {
    pub budget_id: Uuid,
    pub posted_at: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub notes: Option<String>,
    pub import_id: Option<String>,
    pub lines: Vec<NewLine>,
}

impl Engine {
    pub(in crate::ops) async fn require_transaction_in_budget(
        &self,
        db_tx: &DatabaseTransaction,
        budget_id: Uuid,
        transaction_id: Uuid,
    ) -> ResultEngine<transactions::Model> {
        transactions::Entity::find_by_id(transaction_id.to_string())
            .filter(transactions::Column::BudgetId.eq(budget_id.to_string()))
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::TransactionNotFound(transaction_id.to_string()))
    }

    /// Validate and persist a new transaction inside an open DB transaction.
    ///
    /// Each line is checked for a non-zero amount and budget-scoped refs;
    /// the set must pass the transfer-or-non-transfer shape test.
    pub(in crate::ops) async fn build_and_insert_transaction(
        &self,
        db_tx: &DatabaseTransaction,
        cache: &mut LineCheckCache,
        input: TransactionBuildInput,
    ) -> ResultEngine<Transaction> {
        let status = normalize_status(input.status.as_deref())?;
        let posted_at = input.posted_at.unwrap_or_else(Utc::now);
        let notes = normalize_optional_text(input.notes.as_deref());
        let import_id = normalize_optional_text(input.import_id.as_deref());

        let mut lines = Vec::with_capacity(input.lines.len());
        for new_line in &input.lines {
            if new_line.amount_minor == 0 {
                return Err(EngineError::ZeroAmount);
            }
            self.require_line_account(db_tx, cache, input.budget_id, new_line.account_id)
                .await?;
            if let Some(category_id) = new_line.category_id {
                self.require_line_category(db_tx, cache, input.budget_id, category_id)
                    .await?;
            }
            if let Some(payee_id) = new_line.payee_id {
                self.require_line_payee(db_tx, cache, input.budget_id, payee_id)
                    .await?;
            }
            let tag_ids = self
                .require_line_tags(db_tx, cache, input.budget_id, &new_line.tag_ids)
                .await?;

            lines.push(TransactionLine {
                id: Uuid::new_v4(),
                account_id: new_line.account_id,
                category_id: new_line.category_id,
                payee_id: new_line.payee_id,
                amount_minor: new_line.amount_minor,
                memo: normalize_optional_text(new_line.memo.as_deref()),
                tag_ids,
            });
        }

        let snapshots: Vec<LineSnapshot> = lines
            .iter()
            .map(|l| LineSnapshot {
                account_id: l.account_id,
                category_id: l.category_id,
                amount_minor: l.amount_minor,
            })
            .collect();
        require_valid_shape(&snapshots)?;

        let transaction = Transaction {
            id: Uuid::new_v4(),
            budget_id: input.budget_id,
            posted_at,
            status,
            notes,
            import_id,
            created_at: Utc::now(),
            lines,
        };
        self.insert_transaction_records(db_tx, &transaction).await?;
        Ok(transaction)
    }

    /// Insert header, lines and tag links.
    ///
    /// A failed header insert is re-checked against the per-budget
    /// `import_id` unique index so a racing duplicate surfaces as a
    /// conflict instead of a bare database error.
    async fn insert_transaction_records(
        &self,
        db_tx: &DatabaseTransaction,
        transaction: &Transaction,
    ) -> ResultEngine<()> {
        let header: transactions::ActiveModel = transaction.into();
        if let Err(err) = header.insert(db_tx).await {
            if let Some(import_id) = &transaction.import_id {
                let clash = transactions::Entity::find()
                    .filter(transactions::Column::BudgetId.eq(transaction.budget_id.to_string()))
                    .filter(transactions::Column::ImportId.eq(import_id.clone()))
                    .one(db_tx)
                    .await?;
                if clash.is_some() {
                    return Err(EngineError::Conflict(import_id.clone()));
                }
            }
            return Err(err.into());
        }

        self.insert_lines_for(db_tx, transaction.id, &transaction.lines)
            .await
    }

    pub(in crate::ops) async fn insert_lines_for(
        &self,
        db_tx: &DatabaseTransaction,
        transaction_id: Uuid,
        lines: &[TransactionLine],
    ) -> ResultEngine<()> {
        for line in lines {
            line.to_active_model(transaction_id).insert(db_tx).await?;
            for tag_id in &line.tag_ids {
                let link = line_tags::ActiveModel {
                    line_id: ActiveValue::Set(line.id.to_string()),
                    tag_id: ActiveValue::Set(tag_id.to_string()),
                    created_at: ActiveValue::Set(Utc::now()),
                };
                link.insert(db_tx).await?;
            }
        }
        Ok(())
    }

    /// Remove every line of a transaction, tag links first.
    pub(in crate::ops) async fn delete_transaction_lines(
        &self,
        db_tx: &DatabaseTransaction,
        transaction_id: Uuid,
    ) -> ResultEngine<()> {
        let line_ids: Vec<String> = transaction_lines::Entity::find()
            .filter(transaction_lines::Column::TransactionId.eq(transaction_id.to_string()))
            .all(db_tx)
            .await?
            .into_iter()
            .map(|l| l.id)
            .collect();

        if !line_ids.is_empty() {
            line_tags::Entity::delete_many()
                .filter(line_tags::Column::LineId.is_in(line_ids.clone()))
                .exec(db_tx)
                .await?;
            transaction_lines::Entity::delete_many()
                .filter(transaction_lines::Column::Id.is_in(line_ids))
                .exec(db_tx)
                .await?;
        }
        Ok(())
    }

    /// Load a transaction's lines with their tag ids, keyed by line id.
    pub(in crate::ops) async fn load_line_models(
        &self,
        db_tx: &DatabaseTransaction,
        transaction_id: Uuid,
    ) -> ResultEngine<Vec<(transaction_lines::Model, Vec<Uuid>)>> {
        let models = transaction_lines::Entity::find()
            .filter(transaction_lines::Column::TransactionId.eq(transaction_id.to_string()))
            .order_by_asc(transaction_lines::Column::Id)
            .all(db_tx)
            .await?;

        let line_ids: Vec<String> = models.iter().map(|m| m.id.clone()).collect();
        let mut tags_by_line: HashMap<String, Vec<Uuid>> = HashMap::new();
        if !line_ids.is_empty() {
            let links = line_tags::Entity::find()
                .filter(line_tags::Column::LineId.is_in(line_ids))
                .all(db_tx)
                .await?;
            for link in links {
                let tag_id = Uuid::parse_str(&link.tag_id)
                    .map_err(|_| EngineError::TagNotFound(link.tag_id.clone()))?;
                tags_by_line.entry(link.line_id).or_default().push(tag_id);
            }
        }

        let mut out = Vec::with_capacity(models.len());
        for model in models {
            let tags = tags_by_line.remove(&model.id).unwrap_or_default();
            out.push((model, tags));
        }
        Ok(out)
    }
}
