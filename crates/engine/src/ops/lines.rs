//! Line-level referential checks.
//!
//! Every account/category/payee/tag referenced by a transaction line must
//! exist in the transaction's budget. A [`LineCheckCache`] memoizes the
//! per-id answers within one request so a multi-line patch does not repeat
//! lookups; it is created per operation and never shared.

use std::collections::HashMap;

use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, tags};

use super::Engine;

#[derive(Debug, Default)]
pub(super) struct LineCheckCache {
    accounts: HashMap<Uuid, bool>,
    categories: HashMap<Uuid, bool>,
    payees: HashMap<Uuid, bool>,
    tags: HashMap<Uuid, bool>,
}

impl Engine {
    pub(super) async fn require_line_account(
        &self,
        db: &DatabaseTransaction,
        cache: &mut LineCheckCache,
        budget_id: Uuid,
        account_id: Uuid,
    ) -> ResultEngine<()> {
        let known = match cache.accounts.get(&account_id) {
            Some(known) => *known,
            None => {
                let exists = self.account_exists_in_budget(db, budget_id, account_id).await?;
                cache.accounts.insert(account_id, exists);
                exists
            }
        };
        if !known {
            return Err(EngineError::AccountNotFound(account_id.to_string()));
        }
        Ok(())
    }

    pub(super) async fn require_line_category(
        &self,
        db: &DatabaseTransaction,
        cache: &mut LineCheckCache,
        budget_id: Uuid,
        category_id: Uuid,
    ) -> ResultEngine<()> {
        let known = match cache.categories.get(&category_id) {
            Some(known) => *known,
            None => {
                let exists = self
                    .category_exists_in_budget(db, budget_id, category_id)
                    .await?;
                cache.categories.insert(category_id, exists);
                exists
            }
        };
        if !known {
            return Err(EngineError::CategoryNotFound(category_id.to_string()));
        }
        Ok(())
    }

    pub(super) async fn require_line_payee(
        &self,
        db: &DatabaseTransaction,
        cache: &mut LineCheckCache,
        budget_id: Uuid,
        payee_id: Uuid,
    ) -> ResultEngine<()> {
        let known = match cache.payees.get(&payee_id) {
            Some(known) => *known,
            None => {
                let exists = self.payee_exists_in_budget(db, budget_id, payee_id).await?;
                cache.payees.insert(payee_id, exists);
                exists
            }
        };
        if !known {
            return Err(EngineError::PayeeNotFound(payee_id.to_string()));
        }
        Ok(())
    }

    /// Deduplicate `tag_ids` preserving first-seen order, then require
    /// every remaining id to exist in the budget. Returns the deduped set.
    pub(super) async fn require_line_tags(
        &self,
        db: &DatabaseTransaction,
        cache: &mut LineCheckCache,
        budget_id: Uuid,
        tag_ids: &[Uuid],
    ) -> ResultEngine<Vec<Uuid>> {
        let deduped = dedupe_tag_ids(tag_ids);

        let unknown: Vec<Uuid> = deduped
            .iter()
            .filter(|id| !cache.tags.contains_key(id))
            .copied()
            .collect();
        if !unknown.is_empty() {
            let found: Vec<tags::Model> = tags::Entity::find()
                .filter(tags::Column::BudgetId.eq(budget_id.to_string()))
                .filter(
                    tags::Column::Id
                        .is_in(unknown.iter().map(ToString::to_string).collect::<Vec<_>>()),
                )
                .all(db)
                .await?;
            for id in &unknown {
                let exists = found.iter().any(|m| m.id == id.to_string());
                cache.tags.insert(*id, exists);
            }
        }

        for id in &deduped {
            if !cache.tags.get(id).copied().unwrap_or(false) {
                return Err(EngineError::TagNotFound(id.to_string()));
            }
        }
        Ok(deduped)
    }
}

pub(super) fn dedupe_tag_ids(tag_ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = Vec::with_capacity(tag_ids.len());
    for id in tag_ids {
        if !seen.contains(id) {
            seen.push(*id);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedupe_keeps_first_seen_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        assert_eq!(dedupe_tag_ids(&[a, b, a, c, b]), vec![a, b, c]);
    }

    #[test]
    fn dedupe_of_empty_is_empty() {
        assert!(dedupe_tag_ids(&[]).is_empty());
    }
}
