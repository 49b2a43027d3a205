use std::collections::HashMap;

use sea_orm::{QueryFilter, TransactionTrait, prelude::*};

use crate::{BulkImportCmd, BulkImportOutcome, EngineError, ResultEngine, transactions};

use super::lines::LineCheckCache;
use super::{Engine, with_tx};

impl Engine {
    /// Import a batch of externally-sourced transactions.
    ///
    /// Every draft carries an `import_id`; drafts whose id already exists
    /// in the budget are skipped and counted, the rest are created. The
    /// whole batch runs in one DB transaction, so any invalid draft aborts
    /// the import with nothing written.
    pub async fn bulk_import(&self, cmd: BulkImportCmd) -> ResultEngine<BulkImportOutcome> {
        let BulkImportCmd {
            budget_id,
            user_id,
            drafts,
        } = cmd;

        let mut import_ids = Vec::with_capacity(drafts.len());
        for draft in &drafts {
            let import_id = draft.import_id.trim();
            if import_id.is_empty() {
                return Err(EngineError::EmptyName("import_id".to_string()));
            }
            import_ids.push(import_id.to_string());
        }

        // Two drafts with the same import_id cannot both be honored, and
        // silently keeping one would hide a caller bug.
        let mut by_id: HashMap<&str, Vec<usize>> = HashMap::new();
        for (index, import_id) in import_ids.iter().enumerate() {
            by_id.entry(import_id).or_default().push(index);
        }
        let mut indexes: Vec<usize> = by_id
            .values()
            .filter(|positions| positions.len() > 1)
            .flatten()
            .copied()
            .collect();
        if !indexes.is_empty() {
            indexes.sort_unstable();
            return Err(EngineError::DuplicateImportIdInBatch { indexes });
        }

        with_tx!(self, |db_tx| {
            self.require_budget_member(&db_tx, budget_id, user_id).await?;

            let mut cache = LineCheckCache::default();
            let mut outcome = BulkImportOutcome::default();
            for (draft, import_id) in drafts.into_iter().zip(import_ids) {
                let found = transactions::Entity::find()
                    .filter(transactions::Column::BudgetId.eq(budget_id.to_string()))
                    .filter(transactions::Column::ImportId.eq(import_id.clone()))
                    .one(&db_tx)
                    .await?;
                if found.is_some() {
                    outcome.existing += 1;
                    continue;
                }

                self.build_and_insert_transaction(
                    &db_tx,
                    &mut cache,
                    super::transactions::write::TransactionBuildInput {
                        budget_id,
                        posted_at: draft.posted_at,
                        status: draft.status,
                        notes: draft.notes,
                        import_id: Some(import_id),
                        lines: vec![draft.line],
                    },
                )
                .await?;
                outcome.created += 1;
            }
            Ok(outcome)
        })
    }
}
