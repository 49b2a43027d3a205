use std::collections::HashSet;

use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, Patch, ResultEngine, Transaction, TransactionStatus, UpdateTransactionCmd,
    line_tags, transaction_lines, transactions,
};

use super::super::super::lines::LineCheckCache;
use super::super::super::{Engine, normalize_optional_text, with_tx};
use super::super::helpers::{
    LineSnapshot, apply_nullable_text_patch, apply_posted_at_patch, apply_status_patch,
    require_valid_shape,
};

/// Working copy of one line while a patch is merged over it.
struct MergedLine {
    line_id: Uuid,
    account_id: Uuid,
    category_id: Option<Uuid>,
    payee_id: Option<Uuid>,
    amount_minor: i64,
    memo: Option<String>,
    /// `Some` when the patch replaced the tag set.
    new_tags: Option<Vec<Uuid>>,
    touched: bool,
}

impl Engine {
    /// Patch a transaction: only fields the caller mentioned change.
    ///
    /// Header and line patches merge over the stored state, the merged
    /// line set is re-checked against the transfer-or-non-transfer
    /// invariant, and nothing persists unless everything passes.
    pub async fn update_transaction(&self, cmd: UpdateTransactionCmd) -> ResultEngine<Transaction> {
        let UpdateTransactionCmd {
            budget_id,
            transaction_id,
            user_id,
            posted_at,
            status,
            notes,
            import_id,
            lines,
        } = cmd;

        let header_touched =
            posted_at.is_present() || status.is_present() || notes.is_present();
        if !header_touched && import_id.is_absent() && lines.is_absent() {
            return Err(EngineError::NoFieldsToUpdate);
        }

        with_tx!(self, |db_tx| {
            self.require_budget_member(&db_tx, budget_id, user_id).await?;
            let model = self
                .require_transaction_in_budget(&db_tx, budget_id, transaction_id)
                .await?;

            // import_id is fixed at creation. Any change is rejected, and
            // re-sending the stored value is only tolerated as a no-op
            // alongside other fields.
            if import_id.is_present() {
                let submitted = match &import_id {
                    Patch::Set(value) => normalize_optional_text(Some(value.as_str())),
                    _ => None,
                };
                if submitted != model.import_id || (!header_touched && lines.is_absent()) {
                    return Err(EngineError::ImportIdImmutable);
                }
            }

            let current_status = TransactionStatus::try_from(model.status.as_str())?;
            let new_posted_at = apply_posted_at_patch(model.posted_at, &posted_at)?;
            let new_status = apply_status_patch(current_status, &status)?;
            let new_notes = apply_nullable_text_patch(model.notes.clone(), &notes);

            match &lines {
                Patch::Absent => {}
                Patch::Null => {
                    return Err(EngineError::InvalidTransactionLines(
                        "lines must not be null".to_string(),
                    ));
                }
                Patch::Set(patches) => {
                    if patches.is_empty() {
                        return Err(EngineError::InvalidTransactionLines(
                            "lines must not be empty".to_string(),
                        ));
                    }
                    let mut seen = HashSet::new();
                    for patch in patches {
                        if !seen.insert(patch.line_id) {
                            return Err(EngineError::DuplicateLineId(patch.line_id.to_string()));
                        }
                    }
                    if !header_touched && patches.iter().all(|p| !p.is_effective()) {
                        return Err(EngineError::NoFieldsToUpdate);
                    }

                    let existing = self.load_line_models(&db_tx, transaction_id).await?;
                    let mut merged = Vec::with_capacity(existing.len());
                    for (line, _tags) in &existing {
                        merged.push(MergedLine {
                            line_id: Uuid::parse_str(&line.id)
                                .map_err(|_| EngineError::LineNotFound(line.id.clone()))?,
                            account_id: Uuid::parse_str(&line.account_id)
                                .map_err(|_| EngineError::AccountNotFound(line.account_id.clone()))?,
                            category_id: parse_optional(&line.category_id, |raw| {
                                EngineError::CategoryNotFound(raw)
                            })?,
                            payee_id: parse_optional(&line.payee_id, |raw| {
                                EngineError::PayeeNotFound(raw)
                            })?,
                            amount_minor: line.amount_minor,
                            memo: line.memo.clone(),
                            new_tags: None,
                            touched: false,
                        });
                    }

                    let mut cache = LineCheckCache::default();
                    for patch in patches {
                        let line = merged
                            .iter_mut()
                            .find(|l| l.line_id == patch.line_id)
                            .ok_or_else(|| {
                                EngineError::LineNotFound(patch.line_id.to_string())
                            })?;
                        line.touched = true;

                        if let Some(account_id) = patch.account_id {
                            self.require_line_account(&db_tx, &mut cache, budget_id, account_id)
                                .await?;
                            line.account_id = account_id;
                        }
                        match &patch.category_id {
                            Patch::Absent => {}
                            Patch::Null => line.category_id = None,
                            Patch::Set(category_id) => {
                                self.require_line_category(
                                    &db_tx, &mut cache, budget_id, *category_id,
                                )
                                .await?;
                                line.category_id = Some(*category_id);
                            }
                        }
                        match &patch.payee_id {
                            Patch::Absent => {}
                            Patch::Null => line.payee_id = None,
                            Patch::Set(payee_id) => {
                                self.require_line_payee(&db_tx, &mut cache, budget_id, *payee_id)
                                    .await?;
                                line.payee_id = Some(*payee_id);
                            }
                        }
                        if let Some(amount_minor) = patch.amount_minor {
                            if amount_minor == 0 {
                                return Err(EngineError::ZeroAmount);
                            }
                            line.amount_minor = amount_minor;
                        }
                        line.memo = apply_nullable_text_patch(line.memo.take(), &patch.memo);
                        if let Some(tag_ids) = &patch.tag_ids {
                            let deduped = self
                                .require_line_tags(&db_tx, &mut cache, budget_id, tag_ids)
                                .await?;
                            line.new_tags = Some(deduped);
                        }
                    }

                    let snapshots: Vec<LineSnapshot> = merged
                        .iter()
                        .map(|l| LineSnapshot {
                            account_id: l.account_id,
                            category_id: l.category_id,
                            amount_minor: l.amount_minor,
                        })
                        .collect();
                    require_valid_shape(&snapshots)?;

                    for line in merged.iter().filter(|l| l.touched) {
                        let active = transaction_lines::ActiveModel {
                            id: ActiveValue::Set(line.line_id.to_string()),
                            account_id: ActiveValue::Set(line.account_id.to_string()),
                            category_id: ActiveValue::Set(
                                line.category_id.map(|id| id.to_string()),
                            ),
                            payee_id: ActiveValue::Set(line.payee_id.map(|id| id.to_string())),
                            amount_minor: ActiveValue::Set(line.amount_minor),
                            memo: ActiveValue::Set(line.memo.clone()),
                            ..Default::default()
                        };
                        active.update(&db_tx).await?;

                        if let Some(tag_ids) = &line.new_tags {
                            line_tags::Entity::delete_many()
                                .filter(line_tags::Column::LineId.eq(line.line_id.to_string()))
                                .exec(&db_tx)
                                .await?;
                            for tag_id in tag_ids {
                                let link = line_tags::ActiveModel {
                                    line_id: ActiveValue::Set(line.line_id.to_string()),
                                    tag_id: ActiveValue::Set(tag_id.to_string()),
                                    created_at: ActiveValue::Set(chrono::Utc::now()),
                                };
                                link.insert(&db_tx).await?;
                            }
                        }
                    }
                }
            }

            if header_touched {
                let active = transactions::ActiveModel {
                    id: ActiveValue::Set(model.id.clone()),
                    posted_at: ActiveValue::Set(new_posted_at),
                    status: ActiveValue::Set(new_status.as_str().to_string()),
                    notes: ActiveValue::Set(new_notes),
                    ..Default::default()
                };
                active.update(&db_tx).await?;
            }

            let fresh = self
                .require_transaction_in_budget(&db_tx, budget_id, transaction_id)
                .await?;
            self.hydrate_one(&db_tx, fresh).await
        })
    }
}

fn parse_optional(
    raw: &Option<String>,
    err: impl Fn(String) -> EngineError,
) -> ResultEngine<Option<Uuid>> {
    match raw {
        Some(raw) => Uuid::parse_str(raw).map(Some).map_err(|_| err(raw.clone())),
        None => Ok(None),
    }
}
