use uuid::Uuid;

use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{
    Category, EngineError, Patch, ResultEngine, UpdateCategoryCmd, categories,
};

use super::{Engine, normalize_required_name, with_tx};

impl Engine {
    /// Add a category. The tree is at most two levels deep: the chosen
    /// parent must exist in the budget and be a root itself.
    pub async fn new_category(
        &self,
        budget_id: Uuid,
        user_id: Uuid,
        name: &str,
        parent_id: Option<Uuid>,
        sort_order: Option<i32>,
    ) -> ResultEngine<Category> {
        let name = normalize_required_name(name, "category")?;
        with_tx!(self, |db_tx| {
            self.require_budget_member(&db_tx, budget_id, user_id).await?;

            if let Some(parent_id) = parent_id {
                self.require_root_category(&db_tx, budget_id, parent_id).await?;
            }

            self.require_unique_scoped_name::<categories::Entity>(
                &db_tx,
                categories::Column::BudgetId.eq(budget_id.to_string()).into(),
                None,
                &name,
            )
            .await?;

            let category = Category::new(budget_id, name, parent_id, sort_order.unwrap_or(0));
            let model: categories::ActiveModel = (&category).into();
            model.insert(&db_tx).await?;
            Ok(category)
        })
    }

    pub async fn list_categories(
        &self,
        budget_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<Vec<Category>> {
        with_tx!(self, |db_tx| {
            self.require_budget_member(&db_tx, budget_id, user_id).await?;
            let models = categories::Entity::find()
                .filter(categories::Column::BudgetId.eq(budget_id.to_string()))
                .order_by_asc(categories::Column::SortOrder)
                .order_by_asc(categories::Column::Name)
                .all(&db_tx)
                .await?;
            models.into_iter().map(Category::try_from).collect()
        })
    }

    pub async fn category(
        &self,
        budget_id: Uuid,
        category_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<Category> {
        with_tx!(self, |db_tx| {
            self.require_budget_member(&db_tx, budget_id, user_id).await?;
            let model = self
                .find_category_in_budget(&db_tx, budget_id, category_id)
                .await?
                .ok_or_else(|| EngineError::CategoryNotFound(category_id.to_string()))?;
            Category::try_from(model)
        })
    }

    pub async fn update_category(&self, cmd: UpdateCategoryCmd) -> ResultEngine<Category> {
        let UpdateCategoryCmd {
            budget_id,
            category_id,
            user_id,
            name,
            parent_id,
            is_archived,
            sort_order,
        } = cmd;

        if name.is_none()
            && parent_id.is_absent()
            && is_archived.is_none()
            && sort_order.is_none()
        {
            return Err(EngineError::NoFieldsToUpdate);
        }
        let name = name
            .as_deref()
            .map(|n| normalize_required_name(n, "category"))
            .transpose()?;

        with_tx!(self, |db_tx| {
            self.require_budget_member(&db_tx, budget_id, user_id).await?;
            self.find_category_in_budget(&db_tx, budget_id, category_id)
                .await?
                .ok_or_else(|| EngineError::CategoryNotFound(category_id.to_string()))?;

            let mut active = categories::ActiveModel {
                id: ActiveValue::Set(category_id.to_string()),
                ..Default::default()
            };

            if let Some(name) = name {
                self.require_unique_scoped_name::<categories::Entity>(
                    &db_tx,
                    categories::Column::BudgetId.eq(budget_id.to_string()).into(),
                    Some(categories::Column::Id.ne(category_id.to_string()).into()),
                    &name,
                )
                .await?;
                active.name = ActiveValue::Set(name);
            }

            match parent_id {
                Patch::Absent => {}
                Patch::Null => active.parent_id = ActiveValue::Set(None),
                Patch::Set(parent_id) => {
                    if parent_id == category_id {
                        return Err(EngineError::CategoryOwnParent);
                    }
                    self.require_root_category(&db_tx, budget_id, parent_id).await?;

                    // A category with children cannot itself gain a parent.
                    let has_children = categories::Entity::find()
                        .filter(categories::Column::ParentId.eq(category_id.to_string()))
                        .one(&db_tx)
                        .await?
                        .is_some();
                    if has_children {
                        return Err(EngineError::CategoryDepthExceeded(
                            category_id.to_string(),
                        ));
                    }
                    active.parent_id = ActiveValue::Set(Some(parent_id.to_string()));
                }
            }

            if let Some(is_archived) = is_archived {
                active.is_archived = ActiveValue::Set(is_archived);
            }
            if let Some(sort_order) = sort_order {
                active.sort_order = ActiveValue::Set(sort_order);
            }

            let updated = active.update(&db_tx).await?;
            Category::try_from(updated)
        })
    }

    /// Delete a category; lines referencing it fall back to NULL via the FK.
    pub async fn delete_category(
        &self,
        budget_id: Uuid,
        category_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_budget_member(&db_tx, budget_id, user_id).await?;
            self.require_category_in_budget(&db_tx, budget_id, category_id)
                .await?;

            categories::Entity::delete_by_id(category_id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    async fn find_category_in_budget(
        &self,
        db: &DatabaseTransaction,
        budget_id: Uuid,
        category_id: Uuid,
    ) -> ResultEngine<Option<categories::Model>> {
        categories::Entity::find_by_id(category_id.to_string())
            .filter(categories::Column::BudgetId.eq(budget_id.to_string()))
            .one(db)
            .await
            .map_err(Into::into)
    }

    /// The parent candidate must exist in the budget and have no parent.
    async fn require_root_category(
        &self,
        db: &DatabaseTransaction,
        budget_id: Uuid,
        category_id: Uuid,
    ) -> ResultEngine<()> {
        let model = self
            .find_category_in_budget(db, budget_id, category_id)
            .await?
            .ok_or_else(|| EngineError::CategoryNotFound(category_id.to_string()))?;
        if model.parent_id.is_some() {
            return Err(EngineError::CategoryDepthExceeded(category_id.to_string()));
        }
        Ok(())
    }
}
