//! Application error taxonomy and wire rendering.
//!
//! Domain errors are typed variants raised by the services and translated to
//! a stable wire code at the HTTP boundary. Infrastructure failures collapse
//! into `internal_error` with no internal detail exposed to the caller.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Wire representation of an error, nested under `"error"` in the body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed request: empty patch, bad pagination, past expiry, etc.
    #[error("{message}")]
    Validation { message: String, details: Value },

    /// Destination rejected: not a well-formed http/https URL.
    #[error("{message}")]
    InvalidUrl { message: String, details: Value },

    /// A live link already holds the requested short code.
    #[error("Short code is already taken")]
    ShortcodeTaken { details: Value },

    /// The random code generator exhausted its retry budget.
    #[error("Could not allocate a unique short code")]
    CodeGenerationExhausted,

    /// Covers nonexistent, not-owned, deleted, expired, and inactive links —
    /// callers cannot distinguish these on the redirect path.
    #[error("Link not found")]
    LinkNotFound { details: Value },

    #[error("Tag not found")]
    TagNotFound { details: Value },

    /// The owner already has a tag with this name.
    #[error("Tag name is already taken")]
    TagNameTaken { details: Value },

    #[error("{message}")]
    Unauthorized { message: String, details: Value },

    /// Store or cache infrastructure failure. Never retried inline.
    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn validation(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn invalid_url(message: impl Into<String>, details: Value) -> Self {
        Self::InvalidUrl {
            message: message.into(),
            details,
        }
    }

    pub fn shortcode_taken(details: Value) -> Self {
        Self::ShortcodeTaken { details }
    }

    pub fn link_not_found(details: Value) -> Self {
        Self::LinkNotFound { details }
    }

    pub fn tag_not_found(details: Value) -> Self {
        Self::TagNotFound { details }
    }

    pub fn tag_name_taken(details: Value) -> Self {
        Self::TagNameTaken { details }
    }

    pub fn unauthorized(message: impl Into<String>, details: Value) -> Self {
        Self::Unauthorized {
            message: message.into(),
            details,
        }
    }

    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// Stable wire code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation_failed",
            Self::InvalidUrl { .. } => "invalid_url",
            Self::ShortcodeTaken { .. } => "shortcode_taken",
            Self::CodeGenerationExhausted => "code_generation_exhausted",
            Self::LinkNotFound { .. } => "link_not_found",
            Self::TagNotFound { .. } => "tag_not_found",
            Self::TagNameTaken { .. } => "tag_name_taken",
            Self::Unauthorized { .. } => "unauthorized",
            Self::Internal { .. } => "internal_error",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } | Self::InvalidUrl { .. } => StatusCode::BAD_REQUEST,
            Self::ShortcodeTaken { .. } | Self::TagNameTaken { .. } => StatusCode::CONFLICT,
            Self::LinkNotFound { .. } | Self::TagNotFound { .. } => StatusCode::NOT_FOUND,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::CodeGenerationExhausted | Self::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Converts the error into its wire representation.
    pub fn to_error_info(&self) -> ErrorInfo {
        let details = match self {
            Self::Validation { details, .. }
            | Self::InvalidUrl { details, .. }
            | Self::ShortcodeTaken { details }
            | Self::LinkNotFound { details }
            | Self::TagNotFound { details }
            | Self::TagNameTaken { details }
            | Self::Unauthorized { details, .. }
            | Self::Internal { details, .. } => details.clone(),
            Self::CodeGenerationExhausted => json!({}),
        };

        ErrorInfo {
            code: self.code(),
            message: self.to_string(),
            details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.to_error_info(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::validation("Request validation failed", json!({ "errors": e.to_string() }))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        tracing::error!(error = %e, "Database error");
        AppError::internal("Database error", json!({}))
    }
}

/// Returns true if the error is a unique-constraint violation.
///
/// Repositories use this to turn insert conflicts into domain errors
/// (`ShortcodeTaken`, `TagNameTaken`) instead of `internal_error`.
pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}
