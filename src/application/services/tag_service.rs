//! Tag management and link-tag association service.

use std::sync::Arc;

use serde_json::json;

use crate::domain::entities::{normalize_tag_name, Tag, MAX_TAG_NAME_LEN};
use crate::domain::repositories::TagRepository;
use crate::error::AppError;

/// Service enforcing the cross-ownership invariant between links and tags.
///
/// The repository carries the guard inside the mutating statements; this
/// layer adds name normalization and translates missing rows into the
/// uniform not-found errors the API exposes.
pub struct TagService {
    tags: Arc<dyn TagRepository>,
}

impl TagService {
    /// Creates a new tag service.
    pub fn new(tags: Arc<dyn TagRepository>) -> Self {
        Self { tags }
    }

    /// Creates a tag for an owner. The name is trimmed before storage.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if the name is empty or too long
    /// - [`AppError::TagNameTaken`] if the owner already has this name
    pub async fn create_tag(&self, owner_id: &str, name: &str) -> Result<Tag, AppError> {
        let name = validate_name(name)?;
        self.tags.create(owner_id, &name).await
    }

    /// Lists the owner's tags.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn list_tags(&self, owner_id: &str) -> Result<Vec<Tag>, AppError> {
        self.tags.list(owner_id).await
    }

    /// Renames a tag.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if the name is empty or too long
    /// - [`AppError::TagNotFound`] if the tag is absent or foreign
    /// - [`AppError::TagNameTaken`] on a name collision within the owner
    pub async fn rename_tag(&self, owner_id: &str, id: i64, name: &str) -> Result<Tag, AppError> {
        let name = validate_name(name)?;
        self.tags
            .rename(id, owner_id, &name)
            .await?
            .ok_or_else(|| AppError::tag_not_found(json!({ "id": id })))
    }

    /// Deletes a tag; its link associations are detached by cascade.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::TagNotFound`] if the tag is absent or foreign.
    pub async fn delete_tag(&self, owner_id: &str, id: i64) -> Result<(), AppError> {
        if !self.tags.delete(id, owner_id).await? {
            return Err(AppError::tag_not_found(json!({ "id": id })));
        }
        Ok(())
    }

    /// Attaches tags to one of the owner's links and returns the link's
    /// resulting tag set.
    ///
    /// Foreign or unknown tag ids are silently skipped — no edge is created
    /// for them. Already-attached ids are absorbed; the operation is
    /// idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::LinkNotFound`] if the link is absent, deleted,
    /// or owned by someone else.
    pub async fn attach_tags(
        &self,
        owner_id: &str,
        link_id: i64,
        tag_ids: &[i64],
    ) -> Result<Vec<Tag>, AppError> {
        if !self.tags.attach(link_id, owner_id, tag_ids).await? {
            return Err(AppError::link_not_found(json!({ "id": link_id })));
        }

        self.tags.tags_for_link(link_id, owner_id).await
    }

    /// Detaches tags from one of the owner's links and returns the link's
    /// resulting tag set. Detaching an absent edge is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::LinkNotFound`] if the link is absent, deleted,
    /// or owned by someone else.
    pub async fn detach_tags(
        &self,
        owner_id: &str,
        link_id: i64,
        tag_ids: &[i64],
    ) -> Result<Vec<Tag>, AppError> {
        if !self.tags.detach(link_id, owner_id, tag_ids).await? {
            return Err(AppError::link_not_found(json!({ "id": link_id })));
        }

        self.tags.tags_for_link(link_id, owner_id).await
    }
}

fn validate_name(name: &str) -> Result<String, AppError> {
    normalize_tag_name(name).ok_or_else(|| {
        AppError::validation(
            format!("Tag name must be non-empty and at most {MAX_TAG_NAME_LEN} characters"),
            json!({ "name": name }),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockTagRepository;
    use chrono::Utc;

    fn make_tag(id: i64, name: &str, owner: &str) -> Tag {
        Tag {
            id,
            name: name.to_string(),
            owner_id: owner.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn service(repo: MockTagRepository) -> TagService {
        TagService::new(Arc::new(repo))
    }

    #[tokio::test]
    async fn test_create_tag_trims_name() {
        let mut repo = MockTagRepository::new();
        repo.expect_create()
            .withf(|owner, name| owner == "owner-1" && name == "marketing")
            .times(1)
            .returning(|owner, name| Ok(make_tag(1, name, owner)));

        let tag = service(repo)
            .create_tag("owner-1", "  marketing  ")
            .await
            .unwrap();

        assert_eq!(tag.name, "marketing");
    }

    #[tokio::test]
    async fn test_create_tag_rejects_blank_name() {
        let repo = MockTagRepository::new();

        let result = service(repo).create_tag("owner-1", "   ").await;

        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_create_tag_name_conflict() {
        let mut repo = MockTagRepository::new();
        repo.expect_create()
            .times(1)
            .returning(|_, name| Err(AppError::tag_name_taken(serde_json::json!({ "name": name }))));

        let result = service(repo).create_tag("owner-1", "marketing").await;

        assert!(matches!(result.unwrap_err(), AppError::TagNameTaken { .. }));
    }

    #[tokio::test]
    async fn test_rename_missing_tag_is_not_found() {
        let mut repo = MockTagRepository::new();
        repo.expect_rename().times(1).returning(|_, _, _| Ok(None));

        let result = service(repo).rename_tag("owner-1", 42, "launch").await;

        assert!(matches!(result.unwrap_err(), AppError::TagNotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_missing_tag_is_not_found() {
        let mut repo = MockTagRepository::new();
        repo.expect_delete().times(1).returning(|_, _| Ok(false));

        let result = service(repo).delete_tag("owner-1", 42).await;

        assert!(matches!(result.unwrap_err(), AppError::TagNotFound { .. }));
    }

    #[tokio::test]
    async fn test_attach_returns_resulting_tag_set() {
        let mut repo = MockTagRepository::new();
        repo.expect_attach()
            .withf(|link_id, owner, tag_ids| {
                *link_id == 7 && owner == "owner-1" && tag_ids == [1, 2]
            })
            .times(1)
            .returning(|_, _, _| Ok(true));
        repo.expect_tags_for_link().times(1).returning(|_, owner| {
            Ok(vec![
                make_tag(1, "launch", owner),
                make_tag(2, "marketing", owner),
            ])
        });

        let tags = service(repo)
            .attach_tags("owner-1", 7, &[1, 2])
            .await
            .unwrap();

        assert_eq!(tags.len(), 2);
    }

    #[tokio::test]
    async fn test_attach_to_foreign_link_is_not_found() {
        let mut repo = MockTagRepository::new();
        repo.expect_attach().times(1).returning(|_, _, _| Ok(false));

        let result = service(repo).attach_tags("owner-2", 7, &[1]).await;

        assert!(matches!(result.unwrap_err(), AppError::LinkNotFound { .. }));
    }

    #[tokio::test]
    async fn test_detach_absent_edge_is_noop() {
        let mut repo = MockTagRepository::new();
        repo.expect_detach().times(1).returning(|_, _, _| Ok(true));
        repo.expect_tags_for_link()
            .times(1)
            .returning(|_, _| Ok(vec![]));

        let tags = service(repo)
            .detach_tags("owner-1", 7, &[99])
            .await
            .unwrap();

        assert!(tags.is_empty());
    }
}
