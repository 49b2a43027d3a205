//! Category API endpoints

use api_types::category::{CategoriesResponse, CategoryNew, CategoryUpdate, CategoryView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    ServerError,
    server::{ServerState, caller_id, into_patch},
};
use engine::{UpdateCategoryCmd, users};

fn view(category: engine::Category) -> CategoryView {
    CategoryView {
        id: category.id,
        name: category.name,
        parent_id: category.parent_id,
        is_archived: category.is_archived,
        sort_order: category.sort_order,
    }
}

pub async fn create(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
    Json(payload): Json<CategoryNew>,
) -> Result<(StatusCode, Json<CategoryView>), ServerError> {
    let user_id = caller_id(&user)?;
    let category = state
        .engine
        .new_category(
            budget_id,
            user_id,
            &payload.name,
            payload.parent_id,
            payload.sort_order,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(view(category))))
}

pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
) -> Result<Json<CategoriesResponse>, ServerError> {
    let user_id = caller_id(&user)?;
    let categories = state.engine.list_categories(budget_id, user_id).await?;
    Ok(Json(CategoriesResponse {
        categories: categories.into_iter().map(view).collect(),
    }))
}

pub async fn get(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path((budget_id, category_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<CategoryView>, ServerError> {
    let user_id = caller_id(&user)?;
    let category = state
        .engine
        .category(budget_id, category_id, user_id)
        .await?;
    Ok(Json(view(category)))
}

pub async fn update(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path((budget_id, category_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<CategoryUpdate>,
) -> Result<Json<CategoryView>, ServerError> {
    let user_id = caller_id(&user)?;

    let mut cmd = UpdateCategoryCmd::new(budget_id, category_id, user_id);
    if let Some(name) = payload.name {
        cmd = cmd.name(name);
    }
    cmd = cmd.parent(into_patch(payload.parent_id));
    if let Some(is_archived) = payload.is_archived {
        cmd = cmd.archived(is_archived);
    }
    if let Some(sort_order) = payload.sort_order {
        cmd = cmd.sort_order(sort_order);
    }

    let category = state.engine.update_category(cmd).await?;
    Ok(Json(view(category)))
}

pub async fn remove(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path((budget_id, category_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ServerError> {
    let user_id = caller_id(&user)?;
    state
        .engine
        .delete_category(budget_id, category_id, user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
