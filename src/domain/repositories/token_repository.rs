//! Repository trait for API token authentication.

use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// API token metadata. The raw token is never stored; only its HMAC hash.
#[derive(Debug, Clone)]
pub struct ApiToken {
    pub id: i64,
    pub name: String,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
}

/// Repository interface for API token management.
///
/// A token resolves to the opaque owner identifier that scopes every
/// subsequent read and write in the request.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgTokenRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Resolves a token hash to its owner id.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(owner_id))` if the token exists and is not revoked
    /// - `Ok(None)` otherwise
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_owner_by_hash(&self, token_hash: &str) -> Result<Option<String>, AppError>;

    /// Updates the last-used timestamp for a token. Best-effort audit data.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn update_last_used(&self, token_hash: &str) -> Result<(), AppError>;

    /// Creates a new API token bound to an owner.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the name or hash collides with an
    /// existing token. Returns [`AppError::Internal`] on database errors.
    async fn create_token(
        &self,
        name: &str,
        token_hash: &str,
        owner_id: &str,
    ) -> Result<ApiToken, AppError>;

    /// Lists all tokens.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list_tokens(&self) -> Result<Vec<ApiToken>, AppError>;

    /// Revokes a token, preventing further authentication.
    ///
    /// # Returns
    ///
    /// `Ok(false)` if the token does not exist or is already revoked.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn revoke_token(&self, id: i64) -> Result<bool, AppError>;
}
