//! Background worker draining the click feed.
//!
//! Consumes [`ClickEvent`]s from the channel and increments the link's
//! click counter. The redirect path is the only producer and never waits on
//! this worker; a full queue drops events rather than slowing redirects.

use crate::domain::click_event::ClickEvent;
use sqlx::PgPool;
use tokio::sync::mpsc;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::Retry;
use tracing::warn;

/// Runs until the sending side of the channel is dropped.
///
/// Each counter update is retried with exponential backoff on transient
/// store errors; a click lost after the retry budget is logged and dropped.
pub async fn run_click_worker(mut rx: mpsc::Receiver<ClickEvent>, db: PgPool) {
    while let Some(ev) = rx.recv().await {
        let result = Retry::spawn(retry_strategy(), || {
            let db = db.clone();
            let code = ev.code.clone();
            async move {
                sqlx::query(
                    "UPDATE links SET clicks = clicks + 1 WHERE code = $1 AND deleted_at IS NULL",
                )
                .bind(code)
                .execute(&db)
                .await
            }
        })
        .await;

        if let Err(e) = result {
            warn!(code = %ev.code, error = %e, "Dropping click after retries");
        }
    }
}

fn retry_strategy() -> impl Iterator<Item = std::time::Duration> {
    ExponentialBackoff::from_millis(50).map(jitter).take(3)
}
