//! Handler for the public short link redirect.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::domain::click_event::ClickEvent;
use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its destination URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Resolve through the lifecycle service (cache first, store on miss)
/// 2. Send a click event to the background worker (fire-and-forget)
/// 3. Return `302 Found` with the destination in `Location`
///
/// # Errors
///
/// Returns 404 Not Found when the code does not resolve. Nonexistent,
/// deactivated, expired, and deleted codes are deliberately
/// indistinguishable here; only the management API tells an owner why
/// their link stopped resolving.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let url = state.link_service.resolve(&code).await?;

    // Queue full means the click is dropped, never a slower redirect.
    let _ = state.click_sender.try_send(ClickEvent::new(code));

    Ok((StatusCode::FOUND, [(header::LOCATION, url)]).into_response())
}
