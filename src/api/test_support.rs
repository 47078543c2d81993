//! Shared fixtures for handler tests: mock-backed state builders and an
//! in-memory link repository with real uniqueness and lifecycle semantics.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::json;
use sqlx::postgres::PgPoolOptions;
use tokio::sync::mpsc;

use crate::application::services::{AuthService, LinkService, TagService};
use crate::domain::click_event::ClickEvent;
use crate::domain::entities::{Link, LinkPatch, NewLink};
use crate::domain::repositories::{
    LinkFilter, LinkRepository, MockLinkRepository, MockTagRepository, MockTokenRepository,
    StatusFilter, TagRepository,
};
use crate::error::AppError;
use crate::infrastructure::cache::NullCache;
use crate::state::AppState;

/// Builds an [`AppState`] around the given repositories. The database pool
/// is lazy and never connected; the cache is a no-op.
fn base_state(
    link_repo: Arc<dyn LinkRepository>,
    tag_repo: Arc<dyn TagRepository>,
) -> (AppState, mpsc::Receiver<ClickEvent>) {
    let db = PgPoolOptions::new()
        .connect_lazy("postgres://localhost/linkforge_test")
        .expect("lazy pool");

    let (tx, rx) = mpsc::channel(100);

    let state = AppState {
        db: Arc::new(db),
        link_service: Arc::new(LinkService::new(link_repo, Arc::new(NullCache), 3600)),
        tag_service: Arc::new(TagService::new(tag_repo)),
        auth_service: Arc::new(AuthService::new(
            Arc::new(MockTokenRepository::new()),
            "test-signing-secret".to_string(),
        )),
        cache: Arc::new(NullCache),
        click_sender: tx,
        base_url: "https://lnk.example".to_string(),
    };

    (state, rx)
}

pub fn state_with_repos(
    link_repo: InMemoryLinkRepository,
) -> (AppState, mpsc::Receiver<ClickEvent>) {
    base_state(Arc::new(link_repo), Arc::new(MockTagRepository::new()))
}

pub fn state_with_tag_repo(
    tag_repo: MockTagRepository,
) -> (AppState, mpsc::Receiver<ClickEvent>) {
    base_state(Arc::new(MockLinkRepository::new()), Arc::new(tag_repo))
}

/// In-memory [`LinkRepository`] mirroring the store's semantics: live-code
/// uniqueness enforced at insert, soft delete, derived expiry, and tag
/// edges for filter tests.
#[derive(Default)]
pub struct InMemoryLinkRepository {
    links: Mutex<Vec<Link>>,
    tag_edges: Mutex<Vec<(i64, i64)>>,
    next_id: AtomicI64,
}

impl InMemoryLinkRepository {
    pub fn new() -> Self {
        Self {
            links: Mutex::new(Vec::new()),
            tag_edges: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Records a link→tag edge for listing filters.
    pub fn tag_link(&self, link_id: i64, tag_id: i64) {
        self.tag_edges.lock().unwrap().push((link_id, tag_id));
    }

    fn matches_tags(&self, link_id: i64, tag_ids: &Option<Vec<i64>>) -> bool {
        match tag_ids {
            None => true,
            Some(wanted) => {
                let edges = self.tag_edges.lock().unwrap();
                edges
                    .iter()
                    .any(|(l, t)| *l == link_id && wanted.contains(t))
            }
        }
    }

    fn insert(&self, code: &str, url: &str, owner: &str, is_active: bool, expired: bool) {
        let mut links = self.links.lock().unwrap();
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        links.push(Link {
            id,
            code: code.to_string(),
            original_url: url.to_string(),
            owner_id: owner.to_string(),
            is_active,
            expires_at: expired.then(|| Utc::now() - Duration::hours(1)),
            clicks: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        });
    }

    pub fn insert_active(&self, code: &str, url: &str, owner: &str) {
        self.insert(code, url, owner, true, false);
    }

    pub fn insert_deactivated(&self, code: &str, url: &str, owner: &str) {
        self.insert(code, url, owner, false, false);
    }

    pub fn insert_expired(&self, code: &str, url: &str, owner: &str) {
        self.insert(code, url, owner, true, true);
    }

    fn matches_status(link: &Link, status: StatusFilter) -> bool {
        match status {
            StatusFilter::All => true,
            StatusFilter::Active => link.is_active && !link.is_expired(),
            StatusFilter::Inactive => !link.is_active || link.is_expired(),
        }
    }
}

#[async_trait]
impl LinkRepository for InMemoryLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let mut links = self.links.lock().unwrap();

        if links
            .iter()
            .any(|l| l.deleted_at.is_none() && l.code == new_link.code)
        {
            return Err(AppError::shortcode_taken(json!({ "code": new_link.code })));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let link = Link {
            id,
            code: new_link.code,
            original_url: new_link.original_url,
            owner_id: new_link.owner_id,
            is_active: true,
            expires_at: new_link.expires_at,
            clicks: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        };
        links.push(link.clone());

        Ok(link)
    }

    async fn find_resolvable(&self, code: &str) -> Result<Option<Link>, AppError> {
        let links = self.links.lock().unwrap();
        Ok(links
            .iter()
            .find(|l| l.code == code && l.is_resolvable())
            .cloned())
    }

    async fn find_by_id(&self, id: i64, owner_id: &str) -> Result<Option<Link>, AppError> {
        let links = self.links.lock().unwrap();
        Ok(links
            .iter()
            .find(|l| l.id == id && l.owner_id == owner_id && l.deleted_at.is_none())
            .cloned())
    }

    async fn list(
        &self,
        owner_id: &str,
        filter: LinkFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Link>, AppError> {
        let matching: Vec<Link> = {
            let links = self.links.lock().unwrap();
            links
                .iter()
                .filter(|l| {
                    l.owner_id == owner_id
                        && l.deleted_at.is_none()
                        && Self::matches_status(l, filter.status)
                })
                .cloned()
                .collect()
        };
        let mut matching: Vec<Link> = matching
            .into_iter()
            .filter(|l| self.matches_tags(l.id, &filter.tag_ids))
            .collect();

        matching.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));

        Ok(matching
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count(&self, owner_id: &str, filter: LinkFilter) -> Result<i64, AppError> {
        let matching: Vec<i64> = {
            let links = self.links.lock().unwrap();
            links
                .iter()
                .filter(|l| {
                    l.owner_id == owner_id
                        && l.deleted_at.is_none()
                        && Self::matches_status(l, filter.status)
                })
                .map(|l| l.id)
                .collect()
        };

        Ok(matching
            .into_iter()
            .filter(|id| self.matches_tags(*id, &filter.tag_ids))
            .count() as i64)
    }

    async fn update(
        &self,
        id: i64,
        owner_id: &str,
        patch: LinkPatch,
    ) -> Result<Option<Link>, AppError> {
        let mut links = self.links.lock().unwrap();

        if let Some(code) = &patch.code
            && links
                .iter()
                .any(|l| l.deleted_at.is_none() && l.id != id && &l.code == code)
        {
            return Err(AppError::shortcode_taken(json!({ "code": code })));
        }

        let Some(link) = links
            .iter_mut()
            .find(|l| l.id == id && l.owner_id == owner_id && l.deleted_at.is_none())
        else {
            return Ok(None);
        };

        if let Some(code) = patch.code {
            link.code = code;
        }
        if let Some(is_active) = patch.is_active {
            link.is_active = is_active;
        }
        if let Some(expires_at) = patch.expires_at {
            link.expires_at = expires_at;
        }
        link.updated_at = Utc::now();

        Ok(Some(link.clone()))
    }

    async fn soft_delete(&self, id: i64, owner_id: &str) -> Result<Option<Link>, AppError> {
        let mut links = self.links.lock().unwrap();

        let Some(link) = links
            .iter_mut()
            .find(|l| l.id == id && l.owner_id == owner_id && l.deleted_at.is_none())
        else {
            return Ok(None);
        };

        link.deleted_at = Some(Utc::now());
        link.updated_at = Utc::now();
        let deleted = link.clone();
        drop(links);

        // Tombstones carry no tag edges.
        self.tag_edges.lock().unwrap().retain(|(l, _)| *l != id);

        Ok(Some(deleted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Concurrent creates with generated codes never produce duplicate live
    /// codes — uniqueness rests on the store's conditional insert alone.
    #[tokio::test]
    async fn test_concurrent_creates_yield_unique_codes() {
        let service = Arc::new(LinkService::new(
            Arc::new(InMemoryLinkRepository::new()),
            Arc::new(NullCache),
            3600,
        ));

        let mut handles = Vec::new();
        for i in 0..40 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service
                    .create_link("owner-1", &format!("https://example.com/{i}"), None, None)
                    .await
                    .unwrap()
            }));
        }

        let mut codes = std::collections::HashSet::new();
        for handle in handles {
            let link = handle.await.unwrap();
            assert!(codes.insert(link.code), "duplicate live code generated");
        }
        assert_eq!(codes.len(), 40);
    }

    #[tokio::test]
    async fn test_soft_delete_releases_code_for_reuse() {
        let repo = InMemoryLinkRepository::new();

        let first = repo
            .create(NewLink {
                code: "reuse1234".to_string(),
                original_url: "https://example.com/a".to_string(),
                owner_id: "owner-1".to_string(),
                expires_at: None,
            })
            .await
            .unwrap();

        // Live code blocks a second insert.
        assert!(matches!(
            repo.create(NewLink {
                code: "reuse1234".to_string(),
                original_url: "https://example.com/b".to_string(),
                owner_id: "owner-2".to_string(),
                expires_at: None,
            })
            .await
            .unwrap_err(),
            AppError::ShortcodeTaken { .. }
        ));

        repo.soft_delete(first.id, "owner-1").await.unwrap().unwrap();

        // Tombstoned code is claimable again.
        assert!(repo
            .create(NewLink {
                code: "reuse1234".to_string(),
                original_url: "https://example.com/b".to_string(),
                owner_id: "owner-2".to_string(),
                expires_at: None,
            })
            .await
            .is_ok());
    }
}
