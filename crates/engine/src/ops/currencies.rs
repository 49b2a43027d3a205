use sea_orm::{QueryOrder, TransactionTrait, prelude::*};

use crate::{Currency, EngineError, ResultEngine, currencies};

use super::{Engine, normalize_currency_code, with_tx};

impl Engine {
    /// List every currency in the reference table, ordered by code.
    pub async fn list_currencies(&self) -> ResultEngine<Vec<Currency>> {
        with_tx!(self, |db_tx| {
            let models = currencies::Entity::find()
                .order_by_asc(currencies::Column::Code)
                .all(&db_tx)
                .await?;
            models.into_iter().map(Currency::try_from).collect()
        })
    }

    /// Look up a currency in the reference table.
    ///
    /// Codes are matched uppercase; this service never writes the table.
    pub async fn get_currency(&self, code: &str) -> ResultEngine<Currency> {
        let code = normalize_currency_code(code);
        with_tx!(self, |db_tx| {
            let model = currencies::Entity::find_by_id(code.clone())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::CurrencyNotFound(code.clone()))?;
            Currency::try_from(model)
        })
    }
}
