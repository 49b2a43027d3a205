use std::collections::HashMap;
use uuid::Uuid;

use sea_orm::{DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    EngineError, ResultEngine, Transaction, TransactionLine, line_tags, transaction_lines,
    transactions,
};

use super::super::{Engine, with_tx};

impl Engine {
    /// Fetch one transaction with its lines and tag ids.
    pub async fn transaction(
        &self,
        budget_id: Uuid,
        transaction_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            self.require_budget_member(&db_tx, budget_id, user_id).await?;
            let model = self
                .require_transaction_in_budget(&db_tx, budget_id, transaction_id)
                .await?;
            self.hydrate_one(&db_tx, model).await
        })
    }

    /// List a budget's transactions, newest first.
    ///
    /// Total order: posted_at desc, then created_at desc, then id desc
    /// (ids compare lexically as canonical strings).
    pub async fn list_transactions(
        &self,
        budget_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<Vec<Transaction>> {
        with_tx!(self, |db_tx| {
            self.require_budget_member(&db_tx, budget_id, user_id).await?;

            let models = transactions::Entity::find()
                .filter(transactions::Column::BudgetId.eq(budget_id.to_string()))
                .order_by_desc(transactions::Column::PostedAt)
                .order_by_desc(transactions::Column::CreatedAt)
                .order_by_desc(transactions::Column::Id)
                .all(&db_tx)
                .await?;

            self.hydrate_many(&db_tx, models).await
        })
    }

    pub(in crate::ops) async fn hydrate_one(
        &self,
        db_tx: &DatabaseTransaction,
        model: transactions::Model,
    ) -> ResultEngine<Transaction> {
        let mut hydrated = self.hydrate_many(db_tx, vec![model]).await?;
        hydrated
            .pop()
            .ok_or_else(|| EngineError::TransactionNotFound("missing after hydration".to_string()))
    }

    async fn hydrate_many(
        &self,
        db_tx: &DatabaseTransaction,
        models: Vec<transactions::Model>,
    ) -> ResultEngine<Vec<Transaction>> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let tx_ids: Vec<String> = models.iter().map(|m| m.id.clone()).collect();
        let line_models = transaction_lines::Entity::find()
            .filter(transaction_lines::Column::TransactionId.is_in(tx_ids))
            .order_by_asc(transaction_lines::Column::Id)
            .all(db_tx)
            .await?;

        let line_ids: Vec<String> = line_models.iter().map(|m| m.id.clone()).collect();
        let mut tags_by_line: HashMap<String, Vec<Uuid>> = HashMap::new();
        if !line_ids.is_empty() {
            let links = line_tags::Entity::find()
                .filter(line_tags::Column::LineId.is_in(line_ids))
                .order_by_asc(line_tags::Column::TagId)
                .all(db_tx)
                .await?;
            for link in links {
                let tag_id = Uuid::parse_str(&link.tag_id)
                    .map_err(|_| EngineError::TagNotFound(link.tag_id.clone()))?;
                tags_by_line.entry(link.line_id).or_default().push(tag_id);
            }
        }

        let mut lines_by_tx: HashMap<String, Vec<TransactionLine>> = HashMap::new();
        for model in line_models {
            let tx_id = model.transaction_id.clone();
            let tags = tags_by_line.remove(&model.id).unwrap_or_default();
            lines_by_tx.entry(tx_id).or_default().push(model.into_line(tags)?);
        }

        let mut out = Vec::with_capacity(models.len());
        for model in models {
            let lines = lines_by_tx.remove(&model.id).unwrap_or_default();
            out.push(model.into_transaction(lines)?);
        }
        Ok(out)
    }
}
