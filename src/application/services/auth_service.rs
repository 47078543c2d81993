//! Authentication service resolving API tokens to owner identities.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;

use crate::domain::repositories::TokenRepository;
use crate::error::AppError;
use serde_json::json;

type HmacSha256 = Hmac<Sha256>;

/// The verified identity attached to a request by the auth gate.
///
/// Handlers receive this as an explicit extension value — ownership is never
/// read from ambient context, and a request without it structurally cannot
/// reach an owner-scoped handler.
#[derive(Debug, Clone)]
pub struct AuthenticatedOwner {
    pub owner_id: String,
}

/// Service authenticating API requests via Bearer tokens.
///
/// Tokens are hashed with HMAC-SHA256 (keyed by `signing_secret`) before
/// storage and comparison. An attacker with read-only access to the database
/// cannot verify or forge tokens without the server-side secret.
pub struct AuthService {
    repository: Arc<dyn TokenRepository>,
    signing_secret: String,
}

impl AuthService {
    /// Creates a new authentication service.
    ///
    /// # Arguments
    ///
    /// - `repository` - token repository for DB operations
    /// - `signing_secret` - HMAC key; must match the value used when tokens were created
    pub fn new(repository: Arc<dyn TokenRepository>, signing_secret: String) -> Self {
        Self {
            repository,
            signing_secret,
        }
    }

    /// Hashes a raw token with HMAC-SHA256 using the server signing secret.
    ///
    /// Returns a 64-character lowercase hex-encoded MAC. Public so the admin
    /// CLI can hash freshly minted tokens the same way.
    pub fn hash_token(&self, token: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.signing_secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(token.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Authenticates a raw token and resolves it to the owner it belongs to.
    ///
    /// On success, updates the `last_used_at` timestamp for audit purposes.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the token hash matches no
    /// stored credential or the token has been revoked.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn authenticate(&self, token: &str) -> Result<AuthenticatedOwner, AppError> {
        let token_hash = self.hash_token(token);

        let owner_id = self
            .repository
            .find_owner_by_hash(&token_hash)
            .await?
            .ok_or_else(|| {
                AppError::unauthorized(
                    "Unauthorized",
                    json!({"reason": "Invalid or revoked token"}),
                )
            })?;

        let _ = self.repository.update_last_used(&token_hash).await;

        Ok(AuthenticatedOwner { owner_id })
    }
}
