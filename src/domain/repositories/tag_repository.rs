//! Repository trait for tags and link-tag associations.

use crate::domain::entities::Tag;
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for owner-scoped tags and their link associations.
///
/// The cross-ownership invariant — an edge may exist only when link and tag
/// share an owner — is enforced inside the mutating statements themselves,
/// not by prior reads.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgTagRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Creates a tag for an owner.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::TagNameTaken`] if the owner already has a tag
    /// with this name. Returns [`AppError::Internal`] on database errors.
    async fn create(&self, owner_id: &str, name: &str) -> Result<Tag, AppError>;

    /// Finds a tag by id, scoped to its owner.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_id(&self, id: i64, owner_id: &str) -> Result<Option<Tag>, AppError>;

    /// Lists an owner's tags, by name.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list(&self, owner_id: &str) -> Result<Vec<Tag>, AppError>;

    /// Renames a tag.
    ///
    /// # Returns
    ///
    /// `Ok(None)` if no tag matches `id` + `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::TagNameTaken`] on a name collision within the
    /// owner. Returns [`AppError::Internal`] on database errors.
    async fn rename(&self, id: i64, owner_id: &str, name: &str) -> Result<Option<Tag>, AppError>;

    /// Deletes a tag; its link associations are detached by cascade.
    ///
    /// # Returns
    ///
    /// `Ok(false)` if no tag matches `id` + `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn delete(&self, id: i64, owner_id: &str) -> Result<bool, AppError>;

    /// Attaches tags to a link. Edges are inserted only for tags owned by
    /// `owner_id`; ids that are foreign, unknown, or already attached are
    /// silently skipped. The ownership guard is part of the insert itself.
    ///
    /// # Returns
    ///
    /// `Ok(false)` if the link does not exist, is deleted, or is not owned
    /// by `owner_id` — no edge is created in that case.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn attach(&self, link_id: i64, owner_id: &str, tag_ids: &[i64])
        -> Result<bool, AppError>;

    /// Detaches tags from a link. Removing an absent edge is a no-op.
    ///
    /// # Returns
    ///
    /// `Ok(false)` if the link does not exist, is deleted, or is not owned
    /// by `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn detach(&self, link_id: i64, owner_id: &str, tag_ids: &[i64])
        -> Result<bool, AppError>;

    /// Lists the tags attached to a link, scoped to the owner.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn tags_for_link(&self, link_id: i64, owner_id: &str) -> Result<Vec<Tag>, AppError>;
}
