use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, accounts, budget_members, budgets, categories, payees, tags, users,
};

use super::Engine;

/// Generates `_exists_in_budget` and `require_in_budget` methods for a
/// budget-scoped target entity.
macro_rules! impl_ref_in_budget {
    ($exists_fn:ident, $require_fn:ident, $entity:path, $budget_col:expr, $err:ident) => {
        pub(super) async fn $exists_fn(
            &self,
            db: &DatabaseTransaction,
            budget_id: Uuid,
            target_id: Uuid,
        ) -> ResultEngine<bool> {
            <$entity>::find_by_id(target_id.to_string())
                .filter($budget_col.eq(budget_id.to_string()))
                .one(db)
                .await
                .map(|model| model.is_some())
                .map_err(Into::into)
        }

        pub(super) async fn $require_fn(
            &self,
            db: &DatabaseTransaction,
            budget_id: Uuid,
            target_id: Uuid,
        ) -> ResultEngine<()> {
            if !self.$exists_fn(db, budget_id, target_id).await? {
                return Err(EngineError::$err(target_id.to_string()));
            }
            Ok(())
        }
    };
}

impl Engine {
    impl_ref_in_budget!(
        account_exists_in_budget,
        require_account_in_budget,
        accounts::Entity,
        accounts::Column::BudgetId,
        AccountNotFound
    );

    impl_ref_in_budget!(
        category_exists_in_budget,
        require_category_in_budget,
        categories::Entity,
        categories::Column::BudgetId,
        CategoryNotFound
    );

    impl_ref_in_budget!(
        payee_exists_in_budget,
        require_payee_in_budget,
        payees::Entity,
        payees::Column::BudgetId,
        PayeeNotFound
    );

    impl_ref_in_budget!(
        tag_exists_in_budget,
        require_tag_in_budget,
        tags::Entity,
        tags::Column::BudgetId,
        TagNotFound
    );

    async fn find_budget_by_id(
        &self,
        db: &DatabaseTransaction,
        budget_id: Uuid,
    ) -> ResultEngine<Option<budgets::Model>> {
        budgets::Entity::find_by_id(budget_id.to_string())
            .one(db)
            .await
            .map_err(Into::into)
    }

    pub(super) async fn is_budget_member(
        &self,
        db: &DatabaseTransaction,
        budget_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<bool> {
        let row = budget_members::Entity::find_by_id((
            budget_id.to_string(),
            user_id.to_string(),
        ))
        .one(db)
        .await?;
        Ok(row.is_some())
    }

    /// Budget must exist and the user must be a member; not-found and
    /// not-a-member are indistinguishable to the caller on purpose.
    pub(super) async fn require_budget_member(
        &self,
        db: &DatabaseTransaction,
        budget_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<budgets::Model> {
        let model = self
            .find_budget_by_id(db, budget_id)
            .await?
            .ok_or_else(|| EngineError::BudgetNotFound(budget_id.to_string()))?;
        if model.owner_user_id != user_id.to_string()
            && !self.is_budget_member(db, budget_id, user_id).await?
        {
            return Err(EngineError::BudgetNotFound(budget_id.to_string()));
        }
        Ok(model)
    }

    pub(super) async fn require_budget_owner(
        &self,
        db: &DatabaseTransaction,
        budget_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<budgets::Model> {
        let model = self.require_budget_member(db, budget_id, user_id).await?;
        if model.owner_user_id != user_id.to_string() {
            return Err(EngineError::Forbidden(
                "only the budget owner may do this".to_string(),
            ));
        }
        Ok(model)
    }

    pub(super) async fn require_user_by_email(
        &self,
        db: &DatabaseTransaction,
        email: &str,
    ) -> ResultEngine<users::Model> {
        let email = email.trim().to_lowercase();
        users::Entity::find()
            .filter(users::Column::Email.eq(email.clone()))
            .one(db)
            .await?
            .ok_or(EngineError::UserNotFound(email))
    }
}
