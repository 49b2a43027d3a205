use uuid::Uuid;

use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{EngineError, ResultEngine, Tag, tags};

use super::{Engine, normalize_required_name, with_tx};

impl Engine {
    pub async fn new_tag(&self, budget_id: Uuid, user_id: Uuid, name: &str) -> ResultEngine<Tag> {
        let name = normalize_required_name(name, "tag")?;
        with_tx!(self, |db_tx| {
            self.require_budget_member(&db_tx, budget_id, user_id).await?;
            self.require_unique_scoped_name::<tags::Entity>(
                &db_tx,
                tags::Column::BudgetId.eq(budget_id.to_string()).into(),
                None,
                &name,
            )
            .await?;

            let tag = Tag::new(budget_id, name);
            let model: tags::ActiveModel = (&tag).into();
            model.insert(&db_tx).await?;
            Ok(tag)
        })
    }

    pub async fn list_tags(&self, budget_id: Uuid, user_id: Uuid) -> ResultEngine<Vec<Tag>> {
        with_tx!(self, |db_tx| {
            self.require_budget_member(&db_tx, budget_id, user_id).await?;
            let models = tags::Entity::find()
                .filter(tags::Column::BudgetId.eq(budget_id.to_string()))
                .order_by_asc(tags::Column::Name)
                .all(&db_tx)
                .await?;
            models.into_iter().map(Tag::try_from).collect()
        })
    }

    pub async fn tag(&self, budget_id: Uuid, tag_id: Uuid, user_id: Uuid) -> ResultEngine<Tag> {
        with_tx!(self, |db_tx| {
            self.require_budget_member(&db_tx, budget_id, user_id).await?;
            let model = tags::Entity::find_by_id(tag_id.to_string())
                .filter(tags::Column::BudgetId.eq(budget_id.to_string()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::TagNotFound(tag_id.to_string()))?;
            Tag::try_from(model)
        })
    }

    pub async fn rename_tag(
        &self,
        budget_id: Uuid,
        tag_id: Uuid,
        user_id: Uuid,
        new_name: &str,
    ) -> ResultEngine<Tag> {
        let new_name = normalize_required_name(new_name, "tag")?;
        with_tx!(self, |db_tx| {
            self.require_budget_member(&db_tx, budget_id, user_id).await?;
            self.require_tag_in_budget(&db_tx, budget_id, tag_id).await?;
            self.require_unique_scoped_name::<tags::Entity>(
                &db_tx,
                tags::Column::BudgetId.eq(budget_id.to_string()).into(),
                Some(tags::Column::Id.ne(tag_id.to_string()).into()),
                &new_name,
            )
            .await?;

            let active = tags::ActiveModel {
                id: ActiveValue::Set(tag_id.to_string()),
                name: ActiveValue::Set(new_name),
                ..Default::default()
            };
            let updated = active.update(&db_tx).await?;
            Tag::try_from(updated)
        })
    }

    /// Delete a tag; its line links disappear via the FK cascade.
    pub async fn delete_tag(&self, budget_id: Uuid, tag_id: Uuid, user_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_budget_member(&db_tx, budget_id, user_id).await?;
            self.require_tag_in_budget(&db_tx, budget_id, tag_id).await?;

            tags::Entity::delete_by_id(tag_id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }
}
