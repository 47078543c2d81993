//! Handlers for link management endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::link::{
    CreateLinkRequest, LinkResponse, ListLinksParams, ListLinksResponse, UpdateLinkRequest,
};
use crate::api::dto::pagination::PaginationMeta;
use crate::application::services::AuthenticatedOwner;
use crate::domain::entities::LinkPatch;
use crate::domain::repositories::LinkFilter;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link.
///
/// # Endpoint
///
/// `POST /links`
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com/some/long/path",
///   "shortcode": "my-promo",                 // optional
///   "expires_at": "2026-12-31T23:59:59Z"     // optional
/// }
/// ```
///
/// # Errors
///
/// - 400 `invalid_url` for malformed or non-http(s) destinations
/// - 409 `shortcode_taken` when the custom code is held by a live link
/// - 500 `code_generation_exhausted` when the generator runs out of attempts
pub async fn create_link_handler(
    State(state): State<AppState>,
    Extension(owner): Extension<AuthenticatedOwner>,
    Json(payload): Json<CreateLinkRequest>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    payload.validate()?;

    let link = state
        .link_service
        .create_link(
            &owner.owner_id,
            &payload.url,
            payload.shortcode,
            payload.expires_at,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(LinkResponse::from_link(&link, &state.base_url)),
    ))
}

/// Lists the owner's links with status/tag filters and pagination.
///
/// # Endpoint
///
/// `GET /links?status=active|inactive|all&tags=1,2&page=1&limit=20`
///
/// `inactive` matches links that are manually deactivated OR expired.
/// Results are ordered newest first.
pub async fn list_links_handler(
    State(state): State<AppState>,
    Extension(owner): Extension<AuthenticatedOwner>,
    Query(params): Query<ListLinksParams>,
) -> Result<Json<ListLinksResponse>, AppError> {
    let (offset, limit) = params
        .pagination
        .validate_and_get_offset_limit()
        .map_err(|e| AppError::validation(e, json!({})))?;

    let filter = LinkFilter {
        status: params.status.into(),
        tag_ids: params.parse_tag_ids()?,
    };

    let (links, total) = state
        .link_service
        .list_links(&owner.owner_id, filter, limit, offset)
        .await?;

    let data = links
        .iter()
        .map(|l| LinkResponse::from_link(l, &state.base_url))
        .collect();

    Ok(Json(ListLinksResponse {
        data,
        pagination: PaginationMeta::new(
            params.pagination.page(),
            params.pagination.limit(),
            total,
        ),
    }))
}

/// Retrieves one of the owner's links.
///
/// # Endpoint
///
/// `GET /links/{id}`
///
/// # Errors
///
/// Returns 404 if the link does not exist, is deleted, or is owned by a
/// different identity — never 403, to avoid confirming existence.
pub async fn get_link_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(owner): Extension<AuthenticatedOwner>,
) -> Result<Json<LinkResponse>, AppError> {
    let link = state.link_service.get_link(&owner.owner_id, id).await?;

    Ok(Json(LinkResponse::from_link(&link, &state.base_url)))
}

/// Partially updates a link.
///
/// # Endpoint
///
/// `PATCH /links/{id}`
///
/// # Request Body
///
/// Any subset of the fields; a request that changes nothing is rejected.
///
/// ```json
/// {
///   "shortcode": "new-code",
///   "is_active": false,
///   "expires_at": "2026-12-31T23:59:59Z"   // null clears the expiry
/// }
/// ```
///
/// # Cache
///
/// The lifecycle service invalidates the cache for both the old and the
/// new shortcode, so a renamed code stops resolving immediately.
///
/// # Errors
///
/// - 400 on an empty patch or a past expiry
/// - 404 if the link is absent, deleted, or foreign
/// - 409 if the new shortcode is taken
pub async fn update_link_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(owner): Extension<AuthenticatedOwner>,
    Json(payload): Json<UpdateLinkRequest>,
) -> Result<Json<LinkResponse>, AppError> {
    payload.validate()?;

    let patch = LinkPatch {
        code: payload.shortcode,
        is_active: payload.is_active,
        expires_at: payload.expires_at,
    };

    let link = state
        .link_service
        .update_link(&owner.owner_id, id, patch)
        .await?;

    Ok(Json(LinkResponse::from_link(&link, &state.base_url)))
}

/// Soft-deletes a link and returns the tombstoned record.
///
/// # Endpoint
///
/// `DELETE /links/{id}`
///
/// # Behavior
///
/// - The row is kept; `deleted_at` is set and tag edges are detached.
/// - The shortcode becomes eligible for reuse by a new link.
/// - Deleting again returns 404, not a second success.
pub async fn delete_link_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(owner): Extension<AuthenticatedOwner>,
) -> Result<Json<LinkResponse>, AppError> {
    let link = state.link_service.delete_link(&owner.owner_id, id).await?;

    Ok(Json(LinkResponse::from_link(&link, &state.base_url)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{state_with_repos, InMemoryLinkRepository};
    use axum::routing::{get, post};
    use axum::{Extension, Router};
    use axum_test::TestServer;

    fn make_server(repo: InMemoryLinkRepository, owner: &str) -> TestServer {
        let (state, _rx) = state_with_repos(repo);
        let app = Router::new()
            .route("/links", post(create_link_handler).get(list_links_handler))
            .route(
                "/links/{id}",
                get(get_link_handler)
                    .patch(update_link_handler)
                    .delete(delete_link_handler),
            )
            .layer(Extension(AuthenticatedOwner {
                owner_id: owner.to_string(),
            }))
            .with_state(state);
        TestServer::new(app).unwrap()
    }

    #[tokio::test]
    async fn test_create_returns_created_link() {
        let server = make_server(InMemoryLinkRepository::new(), "owner-1");

        let response = server
            .post("/links")
            .json(&json!({ "url": "https://example.com/a", "shortcode": "promo2026" }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["shortcode"], "promo2026");
        assert_eq!(body["original_url"], "https://example.com/a");
        assert_eq!(body["is_active"], true);
        assert!(body["short_url"].as_str().unwrap().ends_with("/promo2026"));
    }

    #[tokio::test]
    async fn test_create_custom_code_conflict_is_409() {
        let server = make_server(InMemoryLinkRepository::new(), "owner-1");

        server
            .post("/links")
            .json(&json!({ "url": "https://example.com/a", "shortcode": "taken1234" }))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .post("/links")
            .json(&json!({ "url": "https://example.com/b", "shortcode": "taken1234" }))
            .await;

        response.assert_status(StatusCode::CONFLICT);
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["error"]["code"], "shortcode_taken");
    }

    #[tokio::test]
    async fn test_create_invalid_url_is_400() {
        let server = make_server(InMemoryLinkRepository::new(), "owner-1");

        let response = server
            .post("/links")
            .json(&json!({ "url": "javascript:alert(1)" }))
            .await;

        response.assert_status_bad_request();
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["error"]["code"], "invalid_url");
    }

    #[tokio::test]
    async fn test_code_reuse_after_soft_delete() {
        let server = make_server(InMemoryLinkRepository::new(), "owner-1");

        let created = server
            .post("/links")
            .json(&json!({ "url": "https://example.com/a", "shortcode": "reuse1234" }))
            .await;
        let id = created.json::<serde_json::Value>()["id"].as_i64().unwrap();

        // Tombstone the first link, releasing its code.
        let deleted = server.delete(&format!("/links/{id}")).await;
        deleted.assert_status_ok();
        assert!(!deleted.json::<serde_json::Value>()["deleted_at"].is_null());

        // The code is claimable again.
        server
            .post("/links")
            .json(&json!({ "url": "https://example.com/b", "shortcode": "reuse1234" }))
            .await
            .assert_status(StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_delete_twice_is_not_found() {
        let server = make_server(InMemoryLinkRepository::new(), "owner-1");

        let created = server
            .post("/links")
            .json(&json!({ "url": "https://example.com/a" }))
            .await;
        let id = created.json::<serde_json::Value>()["id"].as_i64().unwrap();

        server.delete(&format!("/links/{id}")).await.assert_status_ok();
        server
            .delete(&format!("/links/{id}"))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn test_update_with_no_fields_is_400() {
        let server = make_server(InMemoryLinkRepository::new(), "owner-1");

        let created = server
            .post("/links")
            .json(&json!({ "url": "https://example.com/a" }))
            .await;
        let id = created.json::<serde_json::Value>()["id"].as_i64().unwrap();

        let response = server.patch(&format!("/links/{id}")).json(&json!({})).await;

        response.assert_status_bad_request();
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["error"]["code"], "validation_failed");
    }

    #[tokio::test]
    async fn test_update_past_expiry_is_400() {
        let server = make_server(InMemoryLinkRepository::new(), "owner-1");

        let created = server
            .post("/links")
            .json(&json!({ "url": "https://example.com/a" }))
            .await;
        let id = created.json::<serde_json::Value>()["id"].as_i64().unwrap();

        let response = server
            .patch(&format!("/links/{id}"))
            .json(&json!({ "expires_at": "2020-01-01T00:00:00Z" }))
            .await;

        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_foreign_link_reads_as_not_found() {
        let repo = InMemoryLinkRepository::new();
        repo.insert_active("foreign99", "https://example.com/x", "owner-2");
        let server = make_server(repo, "owner-1");

        // Owner-1 cannot see owner-2's link, by id or at all.
        server.get("/links/1").await.assert_status_not_found();
        server
            .patch("/links/1")
            .json(&json!({ "is_active": false }))
            .await
            .assert_status_not_found();
        server.delete("/links/1").await.assert_status_not_found();
    }

    #[tokio::test]
    async fn test_list_shape_and_order() {
        let server = make_server(InMemoryLinkRepository::new(), "owner-1");

        for i in 0..3 {
            server
                .post("/links")
                .json(&json!({ "url": format!("https://example.com/{i}") }))
                .await
                .assert_status(StatusCode::CREATED);
        }

        let response = server.get("/links?page=1&limit=2").await;
        response.assert_status_ok();

        let body = response.json::<serde_json::Value>();
        assert_eq!(body["data"].as_array().unwrap().len(), 2);
        assert_eq!(body["pagination"]["total"], 3);
        assert_eq!(body["pagination"]["total_pages"], 2);
        // Newest first.
        assert_eq!(body["data"][0]["original_url"], "https://example.com/2");
    }

    #[tokio::test]
    async fn test_list_status_inactive_includes_expired_and_deactivated() {
        let repo = InMemoryLinkRepository::new();
        repo.insert_active("activeAA1", "https://example.com/1", "owner-1");
        repo.insert_expired("expiredA1", "https://example.com/2", "owner-1");
        repo.insert_deactivated("pausedAA1", "https://example.com/3", "owner-1");
        let server = make_server(repo, "owner-1");

        let response = server.get("/links?status=inactive").await;
        response.assert_status_ok();

        let body = response.json::<serde_json::Value>();
        let codes: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|l| l["shortcode"].as_str().unwrap())
            .collect();
        assert_eq!(codes.len(), 2);
        assert!(codes.contains(&"expiredA1"));
        assert!(codes.contains(&"pausedAA1"));
    }

    #[tokio::test]
    async fn test_list_filtered_by_tag_returns_only_tagged_links() {
        let repo = InMemoryLinkRepository::new();
        repo.insert_active("firstAAA1", "https://example.com/1", "owner-1");
        repo.insert_active("secondAA1", "https://example.com/2", "owner-1");
        repo.insert_active("thirdAAA1", "https://example.com/3", "owner-1");
        // Tag 10 on links 1 and 3; tag 20 on link 2.
        repo.tag_link(1, 10);
        repo.tag_link(3, 10);
        repo.tag_link(2, 20);
        let server = make_server(repo, "owner-1");

        let response = server.get("/links?tags=10").await;
        response.assert_status_ok();

        let body = response.json::<serde_json::Value>();
        let codes: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|l| l["shortcode"].as_str().unwrap())
            .collect();
        // Exactly the tagged links, newest first.
        assert_eq!(codes, vec!["thirdAAA1", "firstAAA1"]);
        assert_eq!(body["pagination"]["total"], 2);
    }

    #[tokio::test]
    async fn test_list_bad_tags_param_is_400() {
        let server = make_server(InMemoryLinkRepository::new(), "owner-1");

        server
            .get("/links?tags=1,oops")
            .await
            .assert_status_bad_request();
    }
}
