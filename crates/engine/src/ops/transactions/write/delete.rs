use sea_orm::{ModelTrait, TransactionTrait};
use uuid::Uuid;

use crate::ResultEngine;

use super::super::super::{Engine, with_tx};

impl Engine {
    /// Delete a transaction together with its lines and tag links.
    pub async fn delete_transaction(
        &self,
        budget_id: Uuid,
        transaction_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_budget_member(&db_tx, budget_id, user_id).await?;
            let model = self
                .require_transaction_in_budget(&db_tx, budget_id, transaction_id)
                .await?;

            self.delete_transaction_lines(&db_tx, transaction_id).await?;
            model.delete(&db_tx).await?;
            Ok(())
        })
    }
}
