//! Link entity representing a short code to destination URL mapping.

use chrono::{DateTime, Utc};

/// An owner-scoped short link.
///
/// The `clicks` counter is maintained by the click feed worker and is
/// read-only on every other path.
#[derive(Debug, Clone)]
pub struct Link {
    pub id: i64,
    pub code: String,
    pub original_url: String,
    pub owner_id: String,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub clicks: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Link {
    /// Returns true if the link has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Returns true if the link has passed its expiry time.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|e| Utc::now() >= e)
    }

    /// Returns true if a redirect for this link's code should succeed:
    /// not deleted, manually active, and not expired.
    pub fn is_resolvable(&self) -> bool {
        !self.is_deleted() && self.is_active && !self.is_expired()
    }
}

/// Input data for creating a new link.
///
/// Links are born active; deactivation is a separate owner action.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub code: String,
    pub original_url: String,
    pub owner_id: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Partial update for an existing link.
///
/// `None` fields are left unchanged.
/// `expires_at: Some(None)` clears the expiry; `Some(Some(t))` sets it.
#[derive(Debug, Clone, Default)]
pub struct LinkPatch {
    pub code: Option<String>,
    pub is_active: Option<bool>,
    pub expires_at: Option<Option<DateTime<Utc>>>,
}

impl LinkPatch {
    /// Returns true if the patch changes nothing. Such requests are rejected.
    pub fn is_empty(&self) -> bool {
        self.code.is_none() && self.is_active.is_none() && self.expires_at.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn base_link() -> Link {
        Link {
            id: 1,
            code: "abc123XYZ".to_string(),
            original_url: "https://example.com".to_string(),
            owner_id: "owner-1".to_string(),
            is_active: true,
            expires_at: None,
            clicks: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn test_fresh_link_is_resolvable() {
        let link = base_link();
        assert!(!link.is_deleted());
        assert!(!link.is_expired());
        assert!(link.is_resolvable());
    }

    #[test]
    fn test_deleted_link_is_not_resolvable() {
        let link = Link {
            deleted_at: Some(Utc::now()),
            ..base_link()
        };
        assert!(link.is_deleted());
        assert!(!link.is_resolvable());
    }

    #[test]
    fn test_expired_link_is_not_resolvable_even_when_active() {
        let link = Link {
            expires_at: Some(Utc::now() - Duration::seconds(1)),
            ..base_link()
        };
        assert!(link.is_active);
        assert!(link.is_expired());
        assert!(!link.is_resolvable());
    }

    #[test]
    fn test_deactivated_link_is_not_resolvable() {
        let link = Link {
            is_active: false,
            ..base_link()
        };
        assert!(!link.is_expired());
        assert!(!link.is_resolvable());
    }

    #[test]
    fn test_future_expiry_still_resolvable() {
        let link = Link {
            expires_at: Some(Utc::now() + Duration::hours(1)),
            ..base_link()
        };
        assert!(link.is_resolvable());
    }

    #[test]
    fn test_empty_patch() {
        assert!(LinkPatch::default().is_empty());

        let patch = LinkPatch {
            is_active: Some(false),
            ..Default::default()
        };
        assert!(!patch.is_empty());

        let patch = LinkPatch {
            expires_at: Some(None),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
