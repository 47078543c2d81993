//! Link lifecycle service: creation, resolution, update, soft delete.
//!
//! Owns the mediation between the store and the cache. The store is the
//! single source of truth; the cache only ever holds derived copies and is
//! repopulated lazily by the redirect path.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::warn;

use crate::domain::entities::{Link, LinkPatch, NewLink};
use crate::domain::repositories::{LinkFilter, LinkRepository};
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::code_generator::{generate_code, validate_custom_code, MAX_GENERATION_ATTEMPTS};
use crate::utils::url_normalizer::{normalize_url, UrlNormalizationError};

/// Service orchestrating the link lifecycle.
///
/// Every mutation that changes resolvability invalidates the affected cache
/// keys before returning; a rename invalidates both the old and new code so
/// the old code stops resolving immediately rather than drifting until TTL
/// expiry.
pub struct LinkService {
    links: Arc<dyn LinkRepository>,
    cache: Arc<dyn CacheService>,
    cache_ttl_seconds: u64,
}

impl LinkService {
    /// Creates a new link service.
    ///
    /// `cache_ttl_seconds` is the default TTL for cached resolutions; links
    /// with an expiry are cached for at most their remaining validity.
    pub fn new(
        links: Arc<dyn LinkRepository>,
        cache: Arc<dyn CacheService>,
        cache_ttl_seconds: u64,
    ) -> Self {
        Self {
            links,
            cache,
            cache_ttl_seconds,
        }
    }

    /// Creates a short link for an owner.
    ///
    /// With a custom code, the insert is attempted exactly once — the owner
    /// chose that value, and substituting another silently would violate
    /// intent. Without one, random codes are tried against the store's
    /// conditional insert until one lands or the attempt budget runs out.
    ///
    /// No cache write happens here; the first redirect populates it lazily.
    ///
    /// # Errors
    ///
    /// - [`AppError::InvalidUrl`] if the destination is malformed or not http/https
    /// - [`AppError::Validation`] if the custom code is malformed or the expiry is past
    /// - [`AppError::ShortcodeTaken`] if a live link holds the custom code
    /// - [`AppError::CodeGenerationExhausted`] if the retry budget is spent
    pub async fn create_link(
        &self,
        owner_id: &str,
        url: &str,
        custom_code: Option<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<Link, AppError> {
        let original_url = normalize_url(url).map_err(|e| match e {
            UrlNormalizationError::UnsupportedProtocol => AppError::invalid_url(
                "Only http and https destinations are allowed",
                json!({ "url": url }),
            ),
            other => {
                AppError::invalid_url("Invalid URL format", json!({ "reason": other.to_string() }))
            }
        })?;

        validate_future_expiry(expires_at)?;

        if let Some(custom) = custom_code {
            validate_custom_code(&custom)?;

            return self
                .links
                .create(NewLink {
                    code: custom,
                    original_url,
                    owner_id: owner_id.to_string(),
                    expires_at,
                })
                .await;
        }

        for _ in 0..MAX_GENERATION_ATTEMPTS {
            let result = self
                .links
                .create(NewLink {
                    code: generate_code(),
                    original_url: original_url.clone(),
                    owner_id: owner_id.to_string(),
                    expires_at,
                })
                .await;

            match result {
                Err(AppError::ShortcodeTaken { .. }) => continue,
                other => return other,
            }
        }

        warn!(
            attempts = MAX_GENERATION_ATTEMPTS,
            "Code generation exhausted its attempt budget"
        );

        Err(AppError::CodeGenerationExhausted)
    }

    /// Resolves a short code to its destination URL for the redirect path.
    ///
    /// Cache-aside: the cache is consulted first and repopulated after a
    /// store hit. A cache miss or cache failure only means "consult the
    /// store" — it never implies the link does not exist, and it never
    /// fails the request.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::LinkNotFound`] for nonexistent, deleted,
    /// deactivated, and expired codes alike — the caller cannot tell which.
    pub async fn resolve(&self, code: &str) -> Result<String, AppError> {
        match self.cache.get_url(code).await {
            Ok(Some(url)) => {
                metrics::counter!("linkforge_cache_hits_total").increment(1);
                return Ok(url);
            }
            Ok(None) => {
                metrics::counter!("linkforge_cache_misses_total").increment(1);
            }
            Err(e) => {
                metrics::counter!("linkforge_cache_misses_total").increment(1);
                warn!(error = %e, "Cache lookup failed, falling back to store");
            }
        }

        let link = self
            .links
            .find_resolvable(code)
            .await?
            .ok_or_else(|| AppError::link_not_found(json!({})))?;

        if let Some(ttl) = cache_ttl(self.cache_ttl_seconds, link.expires_at, Utc::now()) {
            let cache = self.cache.clone();
            let code = link.code.clone();
            let url = link.original_url.clone();
            tokio::spawn(async move {
                if let Err(e) = cache.set_url(&code, &url, Some(ttl)).await {
                    warn!(error = %e, "Failed to populate cache");
                }
            });
        }

        metrics::counter!("linkforge_redirects_total").increment(1);

        Ok(link.original_url)
    }

    /// Retrieves one of the owner's links.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::LinkNotFound`] if the link does not exist, is
    /// deleted, or belongs to someone else — ownership mismatches are
    /// indistinguishable from absence.
    pub async fn get_link(&self, owner_id: &str, id: i64) -> Result<Link, AppError> {
        self.links
            .find_by_id(id, owner_id)
            .await?
            .ok_or_else(|| AppError::link_not_found(json!({ "id": id })))
    }

    /// Lists the owner's links with the composed filter, returning the page
    /// and the total count across all pages.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn list_links(
        &self,
        owner_id: &str,
        filter: LinkFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Link>, i64), AppError> {
        let links = self
            .links
            .list(owner_id, filter.clone(), limit, offset)
            .await?;
        let total = self.links.count(owner_id, filter).await?;

        Ok((links, total))
    }

    /// Partially updates a link, then invalidates the affected cache keys.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if the patch changes nothing, the new
    ///   expiry is in the past, or the new code is malformed
    /// - [`AppError::ShortcodeTaken`] if the new code is held by a live link
    /// - [`AppError::LinkNotFound`] if the link is absent, deleted, or foreign
    pub async fn update_link(
        &self,
        owner_id: &str,
        id: i64,
        patch: LinkPatch,
    ) -> Result<Link, AppError> {
        if patch.is_empty() {
            return Err(AppError::validation(
                "Update request must change at least one field",
                json!({}),
            ));
        }

        validate_future_expiry(patch.expires_at.flatten())?;

        if let Some(code) = &patch.code {
            validate_custom_code(code)?;
        }

        let current = self
            .links
            .find_by_id(id, owner_id)
            .await?
            .ok_or_else(|| AppError::link_not_found(json!({ "id": id })))?;

        let updated = self
            .links
            .update(id, owner_id, patch)
            .await?
            .ok_or_else(|| AppError::link_not_found(json!({ "id": id })))?;

        self.invalidate_code(&current.code).await;
        if updated.code != current.code {
            self.invalidate_code(&updated.code).await;
        }

        Ok(updated)
    }

    /// Soft-deletes a link, detaching its tag edges, and invalidates its
    /// cache entry. Deleting an already-deleted link reports not-found,
    /// never a second successful deletion.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::LinkNotFound`] if the link is absent, already
    /// deleted, or foreign.
    pub async fn delete_link(&self, owner_id: &str, id: i64) -> Result<Link, AppError> {
        let deleted = self
            .links
            .soft_delete(id, owner_id)
            .await?
            .ok_or_else(|| AppError::link_not_found(json!({ "id": id })))?;

        self.invalidate_code(&deleted.code).await;

        Ok(deleted)
    }

    async fn invalidate_code(&self, code: &str) {
        if let Err(e) = self.cache.invalidate(code).await {
            warn!(code, error = %e, "Failed to invalidate cache entry");
        }
    }
}

/// Rejects timestamps that are already in the past.
fn validate_future_expiry(expires_at: Option<DateTime<Utc>>) -> Result<(), AppError> {
    if let Some(exp) = expires_at
        && exp <= Utc::now()
    {
        return Err(AppError::validation(
            "expires_at must be in the future",
            json!({ "expires_at": exp.to_rfc3339() }),
        ));
    }

    Ok(())
}

/// TTL for a cached resolution: the default, capped at the link's remaining
/// validity. `None` means the entry must not be cached at all (a TTL that
/// rounds down to zero would otherwise outlive the link).
fn cache_ttl(
    default_ttl: u64,
    expires_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<u64> {
    match expires_at {
        None => Some(default_ttl),
        Some(exp) => {
            let remaining = (exp - now).num_seconds();
            if remaining <= 0 {
                None
            } else {
                Some(default_ttl.min(remaining as u64))
            }
        }
    }
}
