//! Cache service trait and error types.

use async_trait::async_trait;
use std::fmt;

/// Errors that can occur during cache operations.
#[derive(Debug)]
pub enum CacheError {
    ConnectionError(String),
    OperationError(String),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ConnectionError(e) => write!(f, "Cache connection error: {}", e),
            Self::OperationError(e) => write!(f, "Cache operation error: {}", e),
        }
    }
}

impl std::error::Error for CacheError {}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Trait for caching shortcode → destination mappings.
///
/// The cache is advisory: it owns no canonical state, a miss never implies
/// the link does not exist, and implementations must degrade gracefully so
/// a dead cache only slows the system down, never breaks it.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache with TTL support
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Retrieves the destination URL for a short code from cache.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(url))` on cache hit
    /// - `Ok(None)` on cache miss or error (fail-open behavior)
    ///
    /// # Errors
    ///
    /// Should not return errors in production implementations. Errors are
    /// logged and treated as cache misses.
    async fn get_url(&self, code: &str) -> CacheResult<Option<String>>;

    /// Stores a mapping with an optional TTL.
    ///
    /// The caller computes the TTL: for links with an expiry, it is capped
    /// at the remaining validity so a cache entry can never outlive its
    /// link. `None` applies the implementation's default TTL.
    ///
    /// # Errors
    ///
    /// Should not propagate errors to callers. Implementations log errors
    /// and return `Ok(())` to avoid disrupting the request flow.
    async fn set_url(
        &self,
        code: &str,
        original_url: &str,
        ttl_seconds: Option<u64>,
    ) -> CacheResult<()>;

    /// Removes a cached mapping.
    ///
    /// Called on every mutation that changes resolvability; a rename
    /// invalidates both the old and the new code.
    ///
    /// # Errors
    ///
    /// Should not propagate errors to callers.
    async fn invalidate(&self, code: &str) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    ///
    /// Used by health check endpoints to report cache status.
    async fn health_check(&self) -> bool;
}
