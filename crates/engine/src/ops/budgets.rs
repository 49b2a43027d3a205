use chrono::Utc;
use uuid::Uuid;

use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr};

use crate::{
    Budget, BudgetMember, EngineError, ResultEngine, accounts, budget_members, budgets,
    categories, line_tags, payees, tags, transaction_lines, transactions, users,
};

use super::{Engine, normalize_currency_code, normalize_required_name, with_tx};

impl Engine {
    /// Create a budget owned by `user_id`.
    ///
    /// The base currency must exist in the reference table; the owner gets
    /// a membership row so member queries never special-case ownership.
    pub async fn new_budget(
        &self,
        name: &str,
        base_currency_code: &str,
        user_id: Uuid,
    ) -> ResultEngine<Budget> {
        let name = normalize_required_name(name, "budget")?;
        let code = normalize_currency_code(base_currency_code);
        with_tx!(self, |db_tx| {
            let currency = crate::currencies::Entity::find_by_id(code.clone())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::CurrencyNotFound(code.clone()))?;

            let budget = Budget::new(name, currency.code, user_id);
            let model: budgets::ActiveModel = (&budget).into();
            model.insert(&db_tx).await?;

            let member = budget_members::ActiveModel {
                budget_id: ActiveValue::Set(budget.id.to_string()),
                user_id: ActiveValue::Set(user_id.to_string()),
                created_at: ActiveValue::Set(Utc::now()),
            };
            member.insert(&db_tx).await?;

            Ok(budget)
        })
    }

    /// List the budgets the user is a member of.
    pub async fn list_budgets(&self, user_id: Uuid) -> ResultEngine<Vec<Budget>> {
        with_tx!(self, |db_tx| {
            let rows: Vec<(budget_members::Model, Option<budgets::Model>)> =
                budget_members::Entity::find()
                    .filter(budget_members::Column::UserId.eq(user_id.to_string()))
                    .find_also_related(budgets::Entity)
                    .order_by_asc(budget_members::Column::CreatedAt)
                    .all(&db_tx)
                    .await?;

            let mut out = Vec::with_capacity(rows.len());
            for (_, budget) in rows {
                if let Some(model) = budget {
                    out.push(Budget::try_from(model)?);
                }
            }
            Ok(out)
        })
    }

    pub async fn budget(&self, budget_id: Uuid, user_id: Uuid) -> ResultEngine<Budget> {
        with_tx!(self, |db_tx| {
            let model = self.require_budget_member(&db_tx, budget_id, user_id).await?;
            Budget::try_from(model)
        })
    }

    /// Rename a budget and/or change its base currency.
    ///
    /// Currency changes are only allowed while the budget has no accounts.
    pub async fn update_budget(
        &self,
        budget_id: Uuid,
        user_id: Uuid,
        name: Option<&str>,
        base_currency_code: Option<&str>,
    ) -> ResultEngine<Budget> {
        if name.is_none() && base_currency_code.is_none() {
            return Err(EngineError::NoFieldsToUpdate);
        }
        let name = name.map(|n| normalize_required_name(n, "budget")).transpose()?;
        with_tx!(self, |db_tx| {
            let model = self.require_budget_owner(&db_tx, budget_id, user_id).await?;

            let mut active = budgets::ActiveModel {
                id: ActiveValue::Set(model.id.clone()),
                ..Default::default()
            };

            if let Some(name) = name {
                active.name = ActiveValue::Set(name);
            }

            if let Some(code) = base_currency_code {
                let code = normalize_currency_code(code);
                let has_accounts = accounts::Entity::find()
                    .filter(accounts::Column::BudgetId.eq(budget_id.to_string()))
                    .one(&db_tx)
                    .await?
                    .is_some();
                if has_accounts && code != model.base_currency_code {
                    return Err(EngineError::CurrencyLocked);
                }
                crate::currencies::Entity::find_by_id(code.clone())
                    .one(&db_tx)
                    .await?
                    .ok_or_else(|| EngineError::CurrencyNotFound(code.clone()))?;
                active.base_currency_code = ActiveValue::Set(code);
            }

            let updated = active.update(&db_tx).await?;
            Budget::try_from(updated)
        })
    }

    /// Delete a budget and everything scoped under it. Owner only.
    ///
    /// Child rows go first, deepest level up, so the account FK on lines
    /// (which restricts instead of cascading) never blocks the sweep.
    pub async fn delete_budget(&self, budget_id: Uuid, user_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self.require_budget_owner(&db_tx, budget_id, user_id).await?;

            let tx_ids: Vec<String> = transactions::Entity::find()
                .filter(transactions::Column::BudgetId.eq(budget_id.to_string()))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|t| t.id)
                .collect();

            if !tx_ids.is_empty() {
                let line_ids: Vec<String> = transaction_lines::Entity::find()
                    .filter(transaction_lines::Column::TransactionId.is_in(tx_ids.clone()))
                    .all(&db_tx)
                    .await?
                    .into_iter()
                    .map(|l| l.id)
                    .collect();

                if !line_ids.is_empty() {
                    line_tags::Entity::delete_many()
                        .filter(line_tags::Column::LineId.is_in(line_ids.clone()))
                        .exec(&db_tx)
                        .await?;
                    transaction_lines::Entity::delete_many()
                        .filter(transaction_lines::Column::Id.is_in(line_ids))
                        .exec(&db_tx)
                        .await?;
                }
                transactions::Entity::delete_many()
                    .filter(transactions::Column::Id.is_in(tx_ids))
                    .exec(&db_tx)
                    .await?;
            }

            let scope = budget_id.to_string();
            accounts::Entity::delete_many()
                .filter(accounts::Column::BudgetId.eq(scope.clone()))
                .exec(&db_tx)
                .await?;
            categories::Entity::delete_many()
                .filter(categories::Column::BudgetId.eq(scope.clone()))
                .exec(&db_tx)
                .await?;
            payees::Entity::delete_many()
                .filter(payees::Column::BudgetId.eq(scope.clone()))
                .exec(&db_tx)
                .await?;
            tags::Entity::delete_many()
                .filter(tags::Column::BudgetId.eq(scope.clone()))
                .exec(&db_tx)
                .await?;
            budget_members::Entity::delete_many()
                .filter(budget_members::Column::BudgetId.eq(scope))
                .exec(&db_tx)
                .await?;

            model.delete(&db_tx).await?;
            Ok(())
        })
    }

    /// List budget members with their emails. Any member may look.
    pub async fn list_budget_members(
        &self,
        budget_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<Vec<BudgetMember>> {
        with_tx!(self, |db_tx| {
            self.require_budget_member(&db_tx, budget_id, user_id).await?;

            let rows: Vec<(budget_members::Model, Option<users::Model>)> =
                budget_members::Entity::find()
                    .filter(budget_members::Column::BudgetId.eq(budget_id.to_string()))
                    .find_also_related(users::Entity)
                    .order_by_asc(budget_members::Column::CreatedAt)
                    .all(&db_tx)
                    .await?;

            let mut out = Vec::with_capacity(rows.len());
            for (member, user) in rows {
                let email = user.map(|u| u.email).unwrap_or_default();
                out.push(member.into_member(email)?);
            }
            Ok(out)
        })
    }

    /// Add a member by email. Owner only; the user must already exist.
    pub async fn add_budget_member(
        &self,
        budget_id: Uuid,
        user_id: Uuid,
        email: &str,
    ) -> ResultEngine<BudgetMember> {
        with_tx!(self, |db_tx| {
            self.require_budget_owner(&db_tx, budget_id, user_id).await?;
            let user = self.require_user_by_email(&db_tx, email).await?;

            let exists = budget_members::Entity::find_by_id((
                budget_id.to_string(),
                user.id.clone(),
            ))
            .one(&db_tx)
            .await?
            .is_some();
            if exists {
                return Err(EngineError::Conflict(user.email));
            }

            let member = budget_members::ActiveModel {
                budget_id: ActiveValue::Set(budget_id.to_string()),
                user_id: ActiveValue::Set(user.id.clone()),
                created_at: ActiveValue::Set(Utc::now()),
            };
            let inserted = member.insert(&db_tx).await?;
            inserted.into_member(user.email)
        })
    }

    /// Remove a member. Owner only; the owner's own row is untouchable.
    pub async fn remove_budget_member(
        &self,
        budget_id: Uuid,
        user_id: Uuid,
        member_user_id: Uuid,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self.require_budget_owner(&db_tx, budget_id, user_id).await?;
            if model.owner_user_id == member_user_id.to_string() {
                return Err(EngineError::Forbidden(
                    "the budget owner cannot be removed".to_string(),
                ));
            }

            let row = budget_members::Entity::find_by_id((
                budget_id.to_string(),
                member_user_id.to_string(),
            ))
            .one(&db_tx)
            .await?
            .ok_or_else(|| EngineError::UserNotFound(member_user_id.to_string()))?;

            row.delete(&db_tx).await?;
            Ok(())
        })
    }

    /// Case-insensitive duplicate-name guard shared by the scoped-name ops.
    pub(super) async fn require_unique_scoped_name<E>(
        &self,
        db: &sea_orm::DatabaseTransaction,
        budget_filter: sea_orm::sea_query::SimpleExpr,
        exclude: Option<sea_orm::sea_query::SimpleExpr>,
        name: &str,
    ) -> ResultEngine<()>
    where
        E: EntityTrait,
    {
        let mut query = E::find()
            .filter(budget_filter)
            .filter(Expr::cust("LOWER(name)").eq(name.to_lowercase()));
        if let Some(exclude) = exclude {
            query = query.filter(exclude);
        }
        if query.one(db).await?.is_some() {
            return Err(EngineError::Conflict(name.to_string()));
        }
        Ok(())
    }
}
