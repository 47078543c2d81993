//! Tag entity: an owner-scoped label attachable to links.

use chrono::{DateTime, Utc};

/// An owner-scoped tag. `(owner_id, name)` is unique.
#[derive(Debug, Clone)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Maximum accepted tag name length, in characters.
pub const MAX_TAG_NAME_LEN: usize = 50;

/// Normalizes and validates a tag name: trimmed, non-empty, bounded length.
///
/// Returns the trimmed name, or `None` if the result is empty or too long.
pub fn normalize_tag_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_TAG_NAME_LEN {
        return None;
    }
    Some(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trims_whitespace() {
        assert_eq!(normalize_tag_name("  marketing  ").as_deref(), Some("marketing"));
    }

    #[test]
    fn test_normalize_rejects_empty() {
        assert!(normalize_tag_name("").is_none());
        assert!(normalize_tag_name("   ").is_none());
    }

    #[test]
    fn test_normalize_rejects_overlong() {
        let long = "x".repeat(MAX_TAG_NAME_LEN + 1);
        assert!(normalize_tag_name(&long).is_none());
    }

    #[test]
    fn test_normalize_accepts_boundary_length() {
        let max = "x".repeat(MAX_TAG_NAME_LEN);
        assert_eq!(normalize_tag_name(&max).as_deref(), Some(max.as_str()));
    }
}
