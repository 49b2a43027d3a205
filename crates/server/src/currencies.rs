//! Read-only currency reference endpoints

use api_types::currency::{CurrenciesResponse, CurrencyView};
use axum::{Json, extract::State};

use crate::{ServerError, server::ServerState};

pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<CurrenciesResponse>, ServerError> {
    let currencies = state.engine.list_currencies().await?;
    Ok(Json(CurrenciesResponse {
        currencies: currencies
            .into_iter()
            .map(|c| CurrencyView {
                code: c.code,
                name: c.name,
                symbol: c.symbol,
                minor_unit: c.minor_unit,
            })
            .collect(),
    }))
}
