use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{ServerState, router, run, run_with_listener, spawn_with_listener};

mod accounts;
mod budgets;
mod categories;
mod currencies;
mod payees;
mod server;
mod tags;
mod transactions;

pub mod types {
    pub mod budget {
        pub use api_types::budget::{
            BudgetNew, BudgetUpdate, BudgetView, BudgetsResponse, MemberAdd, MemberView,
            MembersResponse,
        };
    }

    pub mod currency {
        pub use api_types::currency::{CurrenciesResponse, CurrencyView};
    }

    pub mod account {
        pub use api_types::account::{AccountNew, AccountUpdate, AccountView, AccountsResponse};
    }

    pub mod category {
        pub use api_types::category::{
            CategoriesResponse, CategoryNew, CategoryUpdate, CategoryView,
        };
    }

    pub mod payee {
        pub use api_types::payee::{PayeeNew, PayeeUpdate, PayeeView, PayeesResponse};
    }

    pub mod tag {
        pub use api_types::tag::{TagNew, TagUpdate, TagView, TagsResponse};
    }

    pub mod transaction {
        pub use api_types::transaction::{
            BulkImport, BulkImportResponse, ImportDraft, LineNew, LineUpdate, LineView,
            TransactionNew, TransactionSplit, TransactionUpdate, TransactionView,
            TransactionsResponse, TransferNew,
        };
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::BudgetNotFound(_)
        | EngineError::AccountNotFound(_)
        | EngineError::CategoryNotFound(_)
        | EngineError::PayeeNotFound(_)
        | EngineError::TagNotFound(_)
        | EngineError::TransactionNotFound(_)
        | EngineError::LineNotFound(_)
        | EngineError::UserNotFound(_)
        | EngineError::CurrencyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Conflict(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidStatus(_)
        | EngineError::InvalidAccountType(_)
        | EngineError::ZeroAmount
        | EngineError::DuplicateLineId(_)
        | EngineError::NoFieldsToUpdate
        | EngineError::PostedAtRequired
        | EngineError::StatusRequired
        | EngineError::EmptyName(_)
        | EngineError::InvalidTransactionLines(_)
        | EngineError::TransferCannotBeSplit
        | EngineError::TransferAccountsMustDiffer
        | EngineError::PayeeNotAllowedForTransfers
        | EngineError::ImportIdImmutable
        | EngineError::CategoryDepthExceeded(_)
        | EngineError::CategoryOwnParent
        | EngineError::CurrencyMismatch(_)
        | EngineError::CurrencyLocked
        | EngineError::AccountInUse(_)
        | EngineError::DuplicateImportIdInBatch { .. } => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_forbidden_maps_to_403() {
        let res =
            ServerError::from(EngineError::Forbidden("forbidden".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::BudgetNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflict_maps_to_409() {
        let res = ServerError::from(EngineError::Conflict("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_validation_maps_to_422() {
        let res = ServerError::from(EngineError::ZeroAmount).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let res = ServerError::from(EngineError::ImportIdImmutable).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
