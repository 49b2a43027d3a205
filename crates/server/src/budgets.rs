//! Budget and membership API endpoints

use api_types::budget::{
    BudgetNew, BudgetUpdate, BudgetView, BudgetsResponse, MemberAdd, MemberView, MembersResponse,
};
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

fn view(budget: engine::Budget) -> BudgetView {
    BudgetView {
        id: budget.id,
        name: budget.name,
        currency_code: budget.base_currency_code,
        owner_user_id: budget.owner_user_id,
        created_at: budget.created_at.fixed_offset(),
    }
}

pub async fn create(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<BudgetNew>,
) -> Result<(StatusCode, Json<BudgetView>), ServerError> {
    let user_id = caller_id(&user)?;
    let currency = payload.currency_code.as_deref().unwrap_or("EUR");
    let budget = state
        .engine
        .new_budget(&payload.name, currency, user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(view(budget))))
}

pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<BudgetsResponse>, ServerError> {
    let user_id = caller_id(&user)?;
    let budgets = state.engine.list_budgets(user_id).await?;
    Ok(Json(BudgetsResponse {
        budgets: budgets.into_iter().map(view).collect(),
    }))
}

pub async fn get(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
) -> Result<Json<BudgetView>, ServerError> {
    let user_id = caller_id(&user)?;
    let budget = state.engine.budget(budget_id, user_id).await?;
    Ok(Json(view(budget)))
}

pub async fn update(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
    Json(payload): Json<BudgetUpdate>,
) -> Result<Json<BudgetView>, ServerError> {
    let user_id = caller_id(&user)?;
    let budget = state
        .engine
        .update_budget(
            budget_id,
            user_id,
            payload.name.as_deref(),
            payload.currency_code.as_deref(),
        )
        .await?;
    Ok(Json(view(budget)))
}

pub async fn remove(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    let user_id = caller_id(&user)?;
    state.engine.delete_budget(budget_id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_members(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
) -> Result<Json<MembersResponse>, ServerError> {
    let user_id = caller_id(&user)?;
    let members = state.engine.list_budget_members(budget_id, user_id).await?;
    Ok(Json(MembersResponse {
        members: members
            .into_iter()
            .map(|m| MemberView {
                user_id: m.user_id,
                email: m.email,
            })
            .collect(),
    }))
}

pub async fn add_member(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
    Json(payload): Json<MemberAdd>,
) -> Result<(StatusCode, Json<MemberView>), ServerError> {
    let user_id = caller_id(&user)?;
    let member = state
        .engine
        .add_budget_member(budget_id, user_id, &payload.email)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(MemberView {
            user_id: member.user_id,
            email: member.email,
        }),
    ))
}

pub async fn remove_member(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path((budget_id, member_user_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ServerError> {
    let user_id = caller_id(&user)?;
    state
        .engine
        .remove_budget_member(budget_id, user_id, member_user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
