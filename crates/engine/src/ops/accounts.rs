use uuid::Uuid;

use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    Account, AccountType, EngineError, ResultEngine, accounts, transaction_lines,
};

use super::{Engine, normalize_currency_code, normalize_required_name, with_tx};

impl Engine {
    /// Add an account to a budget.
    ///
    /// The currency, when given, must equal the budget's base currency;
    /// when absent it defaults to it.
    pub async fn new_account(
        &self,
        budget_id: Uuid,
        user_id: Uuid,
        name: &str,
        account_type: &str,
        currency_code: Option<&str>,
    ) -> ResultEngine<Account> {
        let name = normalize_required_name(name, "account")?;
        let account_type = AccountType::try_from(account_type.trim())?;
        with_tx!(self, |db_tx| {
            let budget = self.require_budget_member(&db_tx, budget_id, user_id).await?;

            let currency_code = match currency_code {
                Some(code) => {
                    let code = normalize_currency_code(code);
                    if code != budget.base_currency_code {
                        return Err(EngineError::CurrencyMismatch(format!(
                            "account currency {code} differs from budget base {}",
                            budget.base_currency_code
                        )));
                    }
                    code
                }
                None => budget.base_currency_code.clone(),
            };

            self.require_unique_scoped_name::<accounts::Entity>(
                &db_tx,
                accounts::Column::BudgetId.eq(budget_id.to_string()).into(),
                None,
                &name,
            )
            .await?;

            let account = Account::new(budget_id, name, account_type, currency_code);
            let model: accounts::ActiveModel = (&account).into();
            model.insert(&db_tx).await?;
            Ok(account)
        })
    }

    pub async fn list_accounts(&self, budget_id: Uuid, user_id: Uuid) -> ResultEngine<Vec<Account>> {
        with_tx!(self, |db_tx| {
            self.require_budget_member(&db_tx, budget_id, user_id).await?;
            let models = accounts::Entity::find()
                .filter(accounts::Column::BudgetId.eq(budget_id.to_string()))
                .order_by_asc(accounts::Column::Name)
                .all(&db_tx)
                .await?;
            models.into_iter().map(Account::try_from).collect()
        })
    }

    pub async fn account(
        &self,
        budget_id: Uuid,
        account_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<Account> {
        with_tx!(self, |db_tx| {
            self.require_budget_member(&db_tx, budget_id, user_id).await?;
            let model = accounts::Entity::find_by_id(account_id.to_string())
                .filter(accounts::Column::BudgetId.eq(budget_id.to_string()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::AccountNotFound(account_id.to_string()))?;
            Account::try_from(model)
        })
    }

    pub async fn update_account(
        &self,
        budget_id: Uuid,
        account_id: Uuid,
        user_id: Uuid,
        name: Option<&str>,
        is_active: Option<bool>,
    ) -> ResultEngine<Account> {
        if name.is_none() && is_active.is_none() {
            return Err(EngineError::NoFieldsToUpdate);
        }
        let name = name.map(|n| normalize_required_name(n, "account")).transpose()?;
        with_tx!(self, |db_tx| {
            self.require_budget_member(&db_tx, budget_id, user_id).await?;
            self.require_account_in_budget(&db_tx, budget_id, account_id)
                .await?;

            let mut active = accounts::ActiveModel {
                id: ActiveValue::Set(account_id.to_string()),
                ..Default::default()
            };

            if let Some(name) = name {
                self.require_unique_scoped_name::<accounts::Entity>(
                    &db_tx,
                    accounts::Column::BudgetId.eq(budget_id.to_string()).into(),
                    Some(accounts::Column::Id.ne(account_id.to_string()).into()),
                    &name,
                )
                .await?;
                active.name = ActiveValue::Set(name);
            }
            if let Some(is_active) = is_active {
                active.is_active = ActiveValue::Set(is_active);
            }

            let updated = active.update(&db_tx).await?;
            Account::try_from(updated)
        })
    }

    /// Delete an account. Restricted while any transaction line points at it.
    pub async fn delete_account(
        &self,
        budget_id: Uuid,
        account_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_budget_member(&db_tx, budget_id, user_id).await?;
            self.require_account_in_budget(&db_tx, budget_id, account_id)
                .await?;

            let referenced = transaction_lines::Entity::find()
                .filter(transaction_lines::Column::AccountId.eq(account_id.to_string()))
                .one(&db_tx)
                .await?
                .is_some();
            if referenced {
                return Err(EngineError::AccountInUse(account_id.to_string()));
            }

            accounts::Entity::delete_by_id(account_id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }
}
