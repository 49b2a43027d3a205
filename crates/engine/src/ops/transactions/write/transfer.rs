use sea_orm::TransactionTrait;

use crate::{CreateTransferCmd, EngineError, NewLine, ResultEngine, Transaction};

use super::super::super::lines::LineCheckCache;
use super::super::super::{Engine, with_tx};
use super::TransactionBuildInput;

impl Engine {
    /// Create a two-line transfer between accounts of the same budget.
    ///
    /// The source line gets `-amount`, the destination `+amount`; both
    /// carry the same memo and tags and no category. Payees are rejected.
    pub async fn create_transfer(&self, cmd: CreateTransferCmd) -> ResultEngine<Transaction> {
        let CreateTransferCmd {
            budget_id,
            user_id,
            from_account_id,
            to_account_id,
            amount_minor,
            posted_at,
            status,
            notes,
            payee_id,
            memo,
            tag_ids,
            import_id,
        } = cmd;

        if from_account_id == to_account_id {
            return Err(EngineError::TransferAccountsMustDiffer);
        }
        if amount_minor == 0 {
            return Err(EngineError::ZeroAmount);
        }
        if payee_id.is_some() {
            return Err(EngineError::PayeeNotAllowedForTransfers);
        }
        // i64::MIN has no negation; it cannot be half of a balanced pair.
        let Some(negated) = amount_minor.checked_neg() else {
            return Err(EngineError::InvalidTransactionLines(
                "transfer amount out of range".to_string(),
            ));
        };

        let mut from_line = NewLine::new(from_account_id, negated).tags(tag_ids.clone());
        let mut to_line = NewLine::new(to_account_id, amount_minor).tags(tag_ids);
        if let Some(memo) = memo {
            from_line = from_line.memo(memo.clone());
            to_line = to_line.memo(memo);
        }

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
                    lines: vec![from_line, to_line],
                },
            )
            .await
        })
    }
}
