//! Account API endpoints

use api_types::account::{AccountNew, AccountUpdate, AccountView, AccountsResponse};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    ServerError,
    server::{ServerState, caller_id},
};
use engine::users;

fn view(account: engine::Account) -> AccountView {
    AccountView {
        id: account.id,
        name: account.name,
        account_type: account.account_type.as_str().to_string(),
        currency_code: account.currency_code,
        is_active: account.is_active,
        created_at: account.created_at.fixed_offset(),
    }
}

pub async fn create(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
    Json(payload): Json<AccountNew>,
) -> Result<(StatusCode, Json<AccountView>), ServerError> {
    let user_id = caller_id(&user)?;
    let account = state
        .engine
        .new_account(
            budget_id,
            user_id,
            &payload.name,
            &payload.account_type,
            payload.currency_code.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(view(account))))
}

pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
) -> Result<Json<AccountsResponse>, ServerError> {
    let user_id = caller_id(&user)?;
    let accounts = state.engine.list_accounts(budget_id, user_id).await?;
    Ok(Json(AccountsResponse {
        accounts: accounts.into_iter().map(view).collect(),
    }))
}

pub async fn get(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path((budget_id, account_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<AccountView>, ServerError> {
    let user_id = caller_id(&user)?;
    let account = state.engine.account(budget_id, account_id, user_id).await?;
    Ok(Json(view(account)))
}

pub async fn update(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path((budget_id, account_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<AccountUpdate>,
) -> Result<Json<AccountView>, ServerError> {
    let user_id = caller_id(&user)?;
    let account = state
        .engine
        .update_account(
            budget_id,
            account_id,
            user_id,
            payload.name.as_deref(),
            payload.is_active,
        )
        .await?;
    Ok(Json(view(account)))
}

pub async fn remove(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path((budget_id, account_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ServerError> {
    let user_id = caller_id(&user)?;
    state
        .engine
        .delete_account(budget_id, account_id, user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
