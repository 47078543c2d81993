use std::sync::Arc;

use sqlx::PgPool;
use tokio::sync::mpsc;

use crate::application::services::{AuthService, LinkService, TagService};
use crate::domain::click_event::ClickEvent;
use crate::infrastructure::cache::CacheService;

/// Shared application state injected into all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<PgPool>,
    pub link_service: Arc<LinkService>,
    pub tag_service: Arc<TagService>,
    pub auth_service: Arc<AuthService>,
    pub cache: Arc<dyn CacheService>,
    pub click_sender: mpsc::Sender<ClickEvent>,
    /// Public base URL used to render `short_url` in responses.
    pub base_url: String,
}
