//! DTOs for link management endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_with::serde_as;
use validator::Validate;

use crate::api::dto::pagination::{PaginationMeta, PaginationParams};
use crate::domain::entities::Link;
use crate::domain::repositories::StatusFilter;
use crate::error::AppError;

/// Request body for `POST /links`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLinkRequest {
    /// The destination URL. Scheme must be http or https; anything else is
    /// rejected by the service with `invalid_url`.
    pub url: String,

    /// Optional owner-chosen short code. When present it is used verbatim —
    /// never substituted on conflict.
    #[validate(length(min = 4, max = 32))]
    pub shortcode: Option<String>,

    /// Optional expiry. Must be in the future.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Request body for `PATCH /links/{id}`.
///
/// All fields are optional, but at least one must be present.
///
/// # `expires_at` semantics
///
/// - **Absent** (`expires_at` not in JSON) → leave existing value unchanged
/// - **`null`** → clear expiry (link never expires)
/// - **Timestamp** → set new expiry (must be in the future)
#[serde_as]
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateLinkRequest {
    /// New short code for this link.
    #[validate(length(min = 4, max = 32))]
    pub shortcode: Option<String>,

    /// Owner-controlled activation toggle, independent of expiry.
    pub is_active: Option<bool>,

    /// Expiry timestamp. Absent = no change, null = clear, value = set.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub expires_at: Option<Option<DateTime<Utc>>>,
}

/// Query parameters for `GET /links`.
#[derive(Debug, Deserialize)]
pub struct ListLinksParams {
    #[serde(flatten)]
    pub pagination: PaginationParams,

    /// Status class: `active`, `inactive` (deactivated or expired), or `all`.
    #[serde(default)]
    pub status: StatusParam,

    /// Comma-separated tag ids; links carrying at least one of them match.
    pub tags: Option<String>,
}

impl ListLinksParams {
    /// Parses the `tags` parameter into tag ids.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if any segment is not an integer.
    pub fn parse_tag_ids(&self) -> Result<Option<Vec<i64>>, AppError> {
        let Some(raw) = self.tags.as_deref() else {
            return Ok(None);
        };

        if raw.trim().is_empty() {
            return Ok(None);
        }

        raw.split(',')
            .map(|part| {
                part.trim().parse::<i64>().map_err(|_| {
                    AppError::validation(
                        "tags must be a comma-separated list of ids",
                        json!({ "tags": raw }),
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }
}

/// Status class query value.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusParam {
    Active,
    Inactive,
    #[default]
    All,
}

impl From<StatusParam> for StatusFilter {
    fn from(value: StatusParam) -> Self {
        match value {
            StatusParam::Active => StatusFilter::Active,
            StatusParam::Inactive => StatusFilter::Inactive,
            StatusParam::All => StatusFilter::All,
        }
    }
}

/// JSON representation of a link.
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub id: i64,
    pub shortcode: String,
    pub original_url: String,
    pub short_url: String,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub clicks: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl LinkResponse {
    /// Builds the response shape, deriving the public short URL from the
    /// configured base URL.
    pub fn from_link(link: &Link, base_url: &str) -> Self {
        Self {
            id: link.id,
            shortcode: link.code.clone(),
            original_url: link.original_url.clone(),
            short_url: format!("{}/{}", base_url.trim_end_matches('/'), link.code),
            is_active: link.is_active,
            expires_at: link.expires_at,
            clicks: link.clicks,
            created_at: link.created_at,
            updated_at: link.updated_at,
            deleted_at: link.deleted_at,
        }
    }
}

/// Response body for `GET /links`.
#[derive(Debug, Serialize)]
pub struct ListLinksResponse {
    pub data: Vec<LinkResponse>,
    pub pagination: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_params(tags: Option<&str>) -> ListLinksParams {
        ListLinksParams {
            pagination: PaginationParams {
                page: None,
                limit: None,
            },
            status: StatusParam::All,
            tags: tags.map(|s| s.to_string()),
        }
    }

    #[test]
    fn test_parse_tag_ids_absent() {
        assert_eq!(list_params(None).parse_tag_ids().unwrap(), None);
        assert_eq!(list_params(Some("")).parse_tag_ids().unwrap(), None);
    }

    #[test]
    fn test_parse_tag_ids_list() {
        assert_eq!(
            list_params(Some("1,2, 3")).parse_tag_ids().unwrap(),
            Some(vec![1, 2, 3])
        );
    }

    #[test]
    fn test_parse_tag_ids_rejects_garbage() {
        assert!(list_params(Some("1,foo")).parse_tag_ids().is_err());
    }

    #[test]
    fn test_update_request_expiry_double_option() {
        // Absent → no change
        let req: UpdateLinkRequest = serde_json::from_str(r#"{"is_active": false}"#).unwrap();
        assert!(req.expires_at.is_none());

        // null → clear
        let req: UpdateLinkRequest = serde_json::from_str(r#"{"expires_at": null}"#).unwrap();
        assert_eq!(req.expires_at, Some(None));

        // value → set
        let req: UpdateLinkRequest =
            serde_json::from_str(r#"{"expires_at": "2030-01-01T00:00:00Z"}"#).unwrap();
        assert!(matches!(req.expires_at, Some(Some(_))));
    }

    #[test]
    fn test_status_param_parses_lowercase() {
        let params: ListLinksParams = serde_json::from_str(r#"{"status": "inactive"}"#).unwrap();
        assert!(matches!(params.status, StatusParam::Inactive));
    }

    #[test]
    fn test_link_response_short_url() {
        let link = Link {
            id: 1,
            code: "abc123XYZ".to_string(),
            original_url: "https://example.com".to_string(),
            owner_id: "owner-1".to_string(),
            is_active: true,
            expires_at: None,
            clicks: 3,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        };

        let resp = LinkResponse::from_link(&link, "https://lnk.example/");
        assert_eq!(resp.short_url, "https://lnk.example/abc123XYZ");
        assert_eq!(resp.shortcode, "abc123XYZ");
        assert_eq!(resp.clicks, 3);
    }
}
