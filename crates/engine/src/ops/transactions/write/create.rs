use sea_orm::TransactionTrait;

use crate::{CreateTransactionCmd, ResultEngine, Transaction};

use super::super::super::lines::LineCheckCache;
use super::super::super::{Engine, with_tx};
use super::TransactionBuildInput;

impl Engine {
    /// Create a single-line transaction.
    ///
    /// Status defaults to posted, posted_at to now; the line's amount must
    /// be non-zero and every reference must live in the budget.
    pub async fn create_transaction(&self, cmd: CreateTransactionCmd) -> ResultEngine<Transaction> {
        let CreateTransactionCmd {
            budget_id,
            user_id,
            posted_at,
            status,
            notes,
            import_id,
            line,
        } = cmd;

        with_tx!(self, |db_tx| {
            self.require_budget_member(&db_tx, budget_id, user_id).await?;

            let mut cache = LineCheckCache::default();
            self.build_and_insert_transaction(
                &db_tx,
                &mut cache,
                TransactionBuildInput {
                    budget_id,
                    posted_at,
                    status,
                    notes,
                    import_id,
                    lines: vec![line],
                },
            )
            .await
        })
    }
}
