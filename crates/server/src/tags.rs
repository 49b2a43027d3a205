//! Tag API endpoints

use api_types::tag::{TagNew, TagUpdate, TagView, TagsResponse};
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

fn view(tag: engine::Tag) -> TagView {
    TagView {
        id: tag.id,
        name: tag.name,
    }
}

pub async fn create(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
    Json(payload): Json<TagNew>,
) -> Result<(StatusCode, Json<TagView>), ServerError> {
    let user_id = caller_id(&user)?;
    let tag = state
        .engine
        .new_tag(budget_id, user_id, &payload.name)
        .await?;
    Ok((StatusCode::CREATED, Json(view(tag))))
}

pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
) -> Result<Json<TagsResponse>, ServerError> {
    let user_id = caller_id(&user)?;
    let tags = state.engine.list_tags(budget_id, user_id).await?;
    Ok(Json(TagsResponse {
        tags: tags.into_iter().map(view).collect(),
    }))
}

pub async fn get(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path((budget_id, tag_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<TagView>, ServerError> {
    let user_id = caller_id(&user)?;
    let tag = state.engine.tag(budget_id, tag_id, user_id).await?;
    Ok(Json(view(tag)))
}

pub async fn rename(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path((budget_id, tag_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<TagUpdate>,
) -> Result<Json<TagView>, ServerError> {
    let user_id = caller_id(&user)?;
    let tag = state
        .engine
        .rename_tag(budget_id, tag_id, user_id, &payload.name)
        .await?;
    Ok(Json(view(tag)))
}

pub async fn remove(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path((budget_id, tag_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ServerError> {
    let user_id = caller_id(&user)?;
    state.engine.delete_tag(budget_id, tag_id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
