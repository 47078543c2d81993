//! Management API route configuration.
//!
//! All endpoints here require Bearer token authentication via
//! [`crate::api::middleware::auth`]; the layer attaches the resolved owner
//! identity that every handler takes as an extension.

use crate::api::handlers::{
    attach_tags_handler, create_link_handler, create_tag_handler, delete_link_handler,
    delete_tag_handler, detach_tags_handler, get_link_handler, list_links_handler,
    list_tags_handler, rename_tag_handler, update_link_handler,
};
use crate::state::AppState;
use axum::{
    routing::{get, patch, post},
    Router,
};

/// All owner-scoped management routes.
///
/// # Endpoints
///
/// - `POST   /links`                 - Create a short link
/// - `GET    /links`                 - List links (status/tag filters, pagination)
/// - `GET    /links/{id}`            - Fetch one link
/// - `PATCH  /links/{id}`            - Partially update a link
/// - `DELETE /links/{id}`            - Soft-delete a link
/// - `POST   /links/{id}/tags`       - Attach tags
/// - `POST   /links/{id}/tags/remove`- Detach tags
/// - `POST   /tags`                  - Create a tag
/// - `GET    /tags`                  - List tags
/// - `PATCH  /tags/{id}`             - Rename a tag
/// - `DELETE /tags/{id}`             - Delete a tag
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/links", post(create_link_handler).get(list_links_handler))
        .route(
            "/links/{id}",
            get(get_link_handler)
                .patch(update_link_handler)
                .delete(delete_link_handler),
        )
        .route("/links/{id}/tags", post(attach_tags_handler))
        .route("/links/{id}/tags/remove", post(detach_tags_handler))
        .route("/tags", post(create_tag_handler).get(list_tags_handler))
        .route(
            "/tags/{id}",
            patch(rename_tag_handler).delete(delete_tag_handler),
        )
}
