use uuid::Uuid;

use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{EngineError, Payee, ResultEngine, payees};

use super::{Engine, normalize_required_name, with_tx};

impl Engine {
    pub async fn new_payee(&self, budget_id: Uuid, user_id: Uuid, name: &str) -> ResultEngine<Payee> {
        let name = normalize_required_name(name, "payee")?;
        with_tx!(self, |db_tx| {
            self.require_budget_member(&db_tx, budget_id, user_id).await?;
            self.require_unique_scoped_name::<payees::Entity>(
                &db_tx,
                payees::Column::BudgetId.eq(budget_id.to_string()).into(),
                None,
                &name,
            )
            .await?;

            let payee = Payee::new(budget_id, name);
            let model: payees::ActiveModel = (&payee).into();
            model.insert(&db_tx).await?;
            Ok(payee)
        })
    }

    pub async fn list_payees(&self, budget_id: Uuid, user_id: Uuid) -> ResultEngine<Vec<Payee>> {
        with_tx!(self, |db_tx| {
            self.require_budget_member(&db_tx, budget_id, user_id).await?;
            let models = payees::Entity::find()
                .filter(payees::Column::BudgetId.eq(budget_id.to_string()))
                .order_by_asc(payees::Column::Name)
                .all(&db_tx)
                .await?;
            models.into_iter().map(Payee::try_from).collect()
        })
    }

    pub async fn payee(
        &self,
        budget_id: Uuid,
        payee_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<Payee> {
        with_tx!(self, |db_tx| {
            self.require_budget_member(&db_tx, budget_id, user_id).await?;
            let model = payees::Entity::find_by_id(payee_id.to_string())
                .filter(payees::Column::BudgetId.eq(budget_id.to_string()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::PayeeNotFound(payee_id.to_string()))?;
            Payee::try_from(model)
        })
    }

    pub async fn rename_payee(
        &self,
        budget_id: Uuid,
        payee_id: Uuid,
        user_id: Uuid,
        new_name: &str,
    ) -> ResultEngine<Payee> {
        let new_name = normalize_required_name(new_name, "payee")?;
        with_tx!(self, |db_tx| {
            self.require_budget_member(&db_tx, budget_id, user_id).await?;
            self.require_payee_in_budget(&db_tx, budget_id, payee_id).await?;
            self.require_unique_scoped_name::<payees::Entity>(
                &db_tx,
                payees::Column::BudgetId.eq(budget_id.to_string()).into(),
                Some(payees::Column::Id.ne(payee_id.to_string()).into()),
                &new_name,
            )
            .await?;

            let active = payees::ActiveModel {
                id: ActiveValue::Set(payee_id.to_string()),
                name: ActiveValue::Set(new_name),
                ..Default::default()
            };
            let updated = active.update(&db_tx).await?;
            Payee::try_from(updated)
        })
    }

    /// Delete a payee; lines referencing it fall back to NULL via the FK.
    pub async fn delete_payee(
        &self,
        budget_id: Uuid,
        payee_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_budget_member(&db_tx, budget_id, user_id).await?;
            self.require_payee_in_budget(&db_tx, budget_id, payee_id).await?;

            payees::Entity::delete_by_id(payee_id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }
}
