//! DTOs for tag management and association endpoints.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::Tag;

/// Request body for `POST /tags` and `PATCH /tags/{id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct TagNameRequest {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
}

/// Request body for `POST /links/{id}/tags` and `POST /links/{id}/tags/remove`.
#[derive(Debug, Deserialize)]
pub struct TagIdsRequest {
    pub tag_ids: Vec<i64>,
}

/// JSON representation of a tag.
#[derive(Debug, Serialize)]
pub struct TagResponse {
    pub id: i64,
    pub name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<&Tag> for TagResponse {
    fn from(tag: &Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name.clone(),
            created_at: tag.created_at,
            updated_at: tag.updated_at,
        }
    }
}

/// Response for association endpoints: the link's tag set after the change.
#[derive(Debug, Serialize)]
pub struct LinkTagsResponse {
    pub link_id: i64,
    pub tags: Vec<TagResponse>,
}
