//! Payee API endpoints

use api_types::payee::{PayeeNew, PayeeUpdate, PayeeView, PayeesResponse};
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

fn view(payee: engine::Payee) -> PayeeView {
    PayeeView {
        id: payee.id,
        name: payee.name,
    }
}

pub async fn create(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
    Json(payload): Json<PayeeNew>,
) -> Result<(StatusCode, Json<PayeeView>), ServerError> {
    let user_id = caller_id(&user)?;
    let payee = state
        .engine
        .new_payee(budget_id, user_id, &payload.name)
        .await?;
    Ok((StatusCode::CREATED, Json(view(payee))))
}

pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
) -> Result<Json<PayeesResponse>, ServerError> {
    let user_id = caller_id(&user)?;
    let payees = state.engine.list_payees(budget_id, user_id).await?;
    Ok(Json(PayeesResponse {
        payees: payees.into_iter().map(view).collect(),
    }))
}

pub async fn get(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path((budget_id, payee_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<PayeeView>, ServerError> {
    let user_id = caller_id(&user)?;
    let payee = state.engine.payee(budget_id, payee_id, user_id).await?;
    Ok(Json(view(payee)))
}

pub async fn rename(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path((budget_id, payee_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<PayeeUpdate>,
) -> Result<Json<PayeeView>, ServerError> {
    let user_id = caller_id(&user)?;
    let payee = state
        .engine
        .rename_payee(budget_id, payee_id, user_id, &payload.name)
        .await?;
    Ok(Json(view(payee)))
}

pub async fn remove(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path((budget_id, payee_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ServerError> {
    let user_id = caller_id(&user)?;
    state
        .engine
        .delete_payee(budget_id, payee_id, user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
