//! Handlers for tag management and link-tag association endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use validator::Validate;

use crate::api::dto::tag::{LinkTagsResponse, TagIdsRequest, TagNameRequest, TagResponse};
use crate::application::services::AuthenticatedOwner;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a tag for the owner.
///
/// # Endpoint
///
/// `POST /tags` with `{ "name": "marketing" }`
///
/// # Errors
///
/// - 400 for an empty or overlong name
/// - 409 `tag_name_taken` if the owner already has this name
pub async fn create_tag_handler(
    State(state): State<AppState>,
    Extension(owner): Extension<AuthenticatedOwner>,
    Json(payload): Json<TagNameRequest>,
) -> Result<(StatusCode, Json<TagResponse>), AppError> {
    payload.validate()?;

    let tag = state
        .tag_service
        .create_tag(&owner.owner_id, &payload.name)
        .await?;

    Ok((StatusCode::CREATED, Json(TagResponse::from(&tag))))
}

/// Lists the owner's tags.
///
/// # Endpoint
///
/// `GET /tags`
pub async fn list_tags_handler(
    State(state): State<AppState>,
    Extension(owner): Extension<AuthenticatedOwner>,
) -> Result<Json<Vec<TagResponse>>, AppError> {
    let tags = state.tag_service.list_tags(&owner.owner_id).await?;

    Ok(Json(tags.iter().map(TagResponse::from).collect()))
}

/// Renames a tag.
///
/// # Endpoint
///
/// `PATCH /tags/{id}` with `{ "name": "new-name" }`
pub async fn rename_tag_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(owner): Extension<AuthenticatedOwner>,
    Json(payload): Json<TagNameRequest>,
) -> Result<Json<TagResponse>, AppError> {
    payload.validate()?;

    let tag = state
        .tag_service
        .rename_tag(&owner.owner_id, id, &payload.name)
        .await?;

    Ok(Json(TagResponse::from(&tag)))
}

/// Deletes a tag, detaching it from every link.
///
/// # Endpoint
///
/// `DELETE /tags/{id}`
pub async fn delete_tag_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(owner): Extension<AuthenticatedOwner>,
) -> Result<StatusCode, AppError> {
    state.tag_service.delete_tag(&owner.owner_id, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Attaches tags to a link.
///
/// # Endpoint
///
/// `POST /links/{id}/tags` with `{ "tag_ids": [1, 2] }`
///
/// Tag ids not owned by the caller are skipped without creating an edge;
/// already-attached ids are absorbed. Responds with the link's resulting
/// tag set.
///
/// # Errors
///
/// Returns 404 if the link is absent, deleted, or owned by someone else.
pub async fn attach_tags_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(owner): Extension<AuthenticatedOwner>,
    Json(payload): Json<TagIdsRequest>,
) -> Result<Json<LinkTagsResponse>, AppError> {
    let tags = state
        .tag_service
        .attach_tags(&owner.owner_id, id, &payload.tag_ids)
        .await?;

    Ok(Json(LinkTagsResponse {
        link_id: id,
        tags: tags.iter().map(TagResponse::from).collect(),
    }))
}

/// Detaches tags from a link. Absent edges are ignored.
///
/// # Endpoint
///
/// `POST /links/{id}/tags/remove` with `{ "tag_ids": [1, 2] }`
pub async fn detach_tags_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(owner): Extension<AuthenticatedOwner>,
    Json(payload): Json<TagIdsRequest>,
) -> Result<Json<LinkTagsResponse>, AppError> {
    let tags = state
        .tag_service
        .detach_tags(&owner.owner_id, id, &payload.tag_ids)
        .await?;

    Ok(Json(LinkTagsResponse {
        link_id: id,
        tags: tags.iter().map(TagResponse::from).collect(),
    }))
}
