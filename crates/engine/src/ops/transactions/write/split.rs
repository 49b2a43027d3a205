use sea_orm::TransactionTrait;

use crate::{EngineError, ResultEngine, SplitTransactionCmd, Transaction, TransactionLine};
use uuid::Uuid;

use super::super::super::lines::LineCheckCache;
use super::super::super::{Engine, normalize_optional_text, with_tx};
use super::super::helpers::{LineSnapshot, is_valid_transfer, require_valid_shape};

impl Engine {
    /// Replace a transaction's whole line set with new single-account lines.
    ///
    /// Transfers cannot be split; the replacement set must be a valid
    /// non-transfer. Old lines and their tag links go away atomically.
    pub async fn split_transaction(&self, cmd: SplitTransactionCmd) -> ResultEngine<Transaction> {
        let SplitTransactionCmd {
            budget_id,
            transaction_id,
            user_id,
            lines,
        } = cmd;

        if lines.is_empty() {
            return Err(EngineError::InvalidTransactionLines(
                "a split needs at least one line".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            self.require_budget_member(&db_tx, budget_id, user_id).await?;
            let model = self
                .require_transaction_in_budget(&db_tx, budget_id, transaction_id)
                .await?;

            let existing = self.load_line_models(&db_tx, transaction_id).await?;
            let existing_snapshots: Vec<LineSnapshot> = existing
                .iter()
                .map(|(line, _)| {
                    Ok(LineSnapshot {
                        account_id: parse_account_id(&line.account_id)?,
                        category_id: parse_optional_category(&line.category_id)?,
                        amount_minor: line.amount_minor,
                    })
                })
                .collect::<ResultEngine<_>>()?;
            if is_valid_transfer(&existing_snapshots) {
                return Err(EngineError::TransferCannotBeSplit);
            }

            let mut cache = LineCheckCache::default();
            let mut new_lines = Vec::with_capacity(lines.len());
            for new_line in &lines {
                if new_line.amount_minor == 0 {
                    return Err(EngineError::ZeroAmount);
                }
                self.require_line_account(&db_tx, &mut cache, budget_id, new_line.account_id)
                    .await?;
                if let Some(category_id) = new_line.category_id {
                    self.require_line_category(&db_tx, &mut cache, budget_id, category_id)
                        .await?;
                }
                if let Some(payee_id) = new_line.payee_id {
                    self.require_line_payee(&db_tx, &mut cache, budget_id, payee_id)
                        .await?;
                }
                let tag_ids = self
                    .require_line_tags(&db_tx, &mut cache, budget_id, &new_line.tag_ids)
                    .await?;

                new_lines.push(TransactionLine {
                    id: Uuid::new_v4(),
                    account_id: new_line.account_id,
                    category_id: new_line.category_id,
                    payee_id: new_line.payee_id,
                    amount_minor: new_line.amount_minor,
                    memo: normalize_optional_text(new_line.memo.as_deref()),
                    tag_ids,
                });
            }

            let snapshots: Vec<LineSnapshot> = new_lines
                .iter()
                .map(|l| LineSnapshot {
                    account_id: l.account_id,
                    category_id: l.category_id,
                    amount_minor: l.amount_minor,
                })
                .collect();
            require_valid_shape(&snapshots)?;
            if is_valid_transfer(&snapshots) {
                return Err(EngineError::InvalidTransactionLines(
                    "a split must stay a single-account set".to_string(),
                ));
            }

            self.delete_transaction_lines(&db_tx, transaction_id).await?;
            self.insert_lines_for(&db_tx, transaction_id, &new_lines).await?;

            self.hydrate_one(&db_tx, model).await
        })
    }
}

fn parse_account_id(raw: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(raw).map_err(|_| EngineError::AccountNotFound(raw.to_string()))
}

fn parse_optional_category(raw: &Option<String>) -> ResultEngine<Option<Uuid>> {
    match raw {
        Some(raw) => Uuid::parse_str(raw)
            .map(Some)
            .map_err(|_| EngineError::CategoryNotFound(raw.clone())),
        None => Ok(None),
    }
}
