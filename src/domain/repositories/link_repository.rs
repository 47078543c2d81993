//! Repository trait for short link data access.

use crate::domain::entities::{Link, LinkPatch, NewLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Status class filter for link listings.
///
/// `Inactive` is the union of manually-deactivated and expired links;
/// expiry is derived at query time, never written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    Active,
    Inactive,
    #[default]
    All,
}

impl StatusFilter {
    /// Stable discriminator string bound into SQL predicates.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::All => "all",
        }
    }
}

/// Composed listing filter. Ownership scoping is a separate, mandatory
/// argument so a filter can never widen a query across owners.
#[derive(Debug, Clone, Default)]
pub struct LinkFilter {
    pub status: StatusFilter,
    /// When set, only links carrying at least one of these tag ids match.
    pub tag_ids: Option<Vec<i64>>,
}

/// Repository interface for managing short links.
///
/// Soft-deleted links are invisible to every method except where noted;
/// their codes are eligible for reuse by new links.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Inserts a new link in a single atomic operation.
    ///
    /// Uniqueness among live links is enforced by the store itself, so two
    /// concurrent writers racing on the same code cannot both succeed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ShortcodeTaken`] if a live link already holds the
    /// code. Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Finds the live, currently resolvable link for a code: not deleted,
    /// manually active, and not expired. Used only by the redirect path,
    /// which is why it is not owner-scoped.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_resolvable(&self, code: &str) -> Result<Option<Link>, AppError>;

    /// Finds a non-deleted link by id, scoped to its owner.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_id(&self, id: i64, owner_id: &str) -> Result<Option<Link>, AppError>;

    /// Lists non-deleted links for an owner, newest first (creation time
    /// descending, id descending as the tie break).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list(
        &self,
        owner_id: &str,
        filter: LinkFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Link>, AppError>;

    /// Counts the links [`Self::list`] would return across all pages.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn count(&self, owner_id: &str, filter: LinkFilter) -> Result<i64, AppError>;

    /// Partially updates a non-deleted link owned by `owner_id`.
    ///
    /// Only fields present in [`LinkPatch`] are modified; `updated_at` is
    /// always refreshed.
    ///
    /// # Returns
    ///
    /// `Ok(None)` if no live link matches `id` + `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ShortcodeTaken`] if the patch renames the code to
    /// one held by another live link. Returns [`AppError::Internal`] on
    /// database errors.
    async fn update(
        &self,
        id: i64,
        owner_id: &str,
        patch: LinkPatch,
    ) -> Result<Option<Link>, AppError>;

    /// Soft-deletes a link (sets `deleted_at`) and detaches its tag edges in
    /// the same transaction.
    ///
    /// # Returns
    ///
    /// The tombstoned record, or `Ok(None)` if the link does not exist, is
    /// not owned by `owner_id`, or was already deleted.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn soft_delete(&self, id: i64, owner_id: &str) -> Result<Option<Link>, AppError>;
}
