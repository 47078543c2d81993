//! PostgreSQL implementation of the link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

use crate::domain::entities::{Link, LinkPatch, NewLink};
use crate::domain::repositories::{LinkFilter, LinkRepository};
use crate::error::{is_unique_violation, AppError};

const LINK_COLUMNS: &str =
    "id, code, original_url, owner_id, is_active, expires_at, clicks, created_at, updated_at, deleted_at";

/// Status class filter as a single SQL predicate over `$2`.
///
/// Shared between `list` and `count` so the page and its total can never
/// disagree about which links match. "Expired" is derived from `expires_at`
/// at query time; nothing is ever written back.
const STATUS_PREDICATE: &str = "($2::text = 'all' \
     OR ($2::text = 'active' AND is_active AND (expires_at IS NULL OR expires_at > NOW())) \
     OR ($2::text = 'inactive' AND (NOT is_active OR (expires_at IS NOT NULL AND expires_at <= NOW()))))";

/// "Has at least one of these tags" as a SQL predicate over `$3`;
/// a NULL array means no tag filtering.
const TAG_PREDICATE: &str = "($3::bigint[] IS NULL OR EXISTS \
     (SELECT 1 FROM link_tags lt WHERE lt.link_id = links.id AND lt.tag_id = ANY($3)))";

#[derive(FromRow)]
struct LinkRow {
    id: i64,
    code: String,
    original_url: String,
    owner_id: String,
    is_active: bool,
    expires_at: Option<DateTime<Utc>>,
    clicks: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl From<LinkRow> for Link {
    fn from(r: LinkRow) -> Self {
        Link {
            id: r.id,
            code: r.code,
            original_url: r.original_url,
            owner_id: r.owner_id,
            is_active: r.is_active,
            expires_at: r.expires_at,
            clicks: r.clicks,
            created_at: r.created_at,
            updated_at: r.updated_at,
            deleted_at: r.deleted_at,
        }
    }
}

/// PostgreSQL repository for link storage and retrieval.
///
/// Code uniqueness among live links rests on the partial unique index
/// `links_code_live_key`; inserts and renames never pre-read for existence.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let query = format!(
            "INSERT INTO links (code, original_url, owner_id, expires_at) \
             VALUES ($1, $2, $3, $4) RETURNING {LINK_COLUMNS}"
        );

        let row = sqlx::query_as::<_, LinkRow>(&query)
            .bind(&new_link.code)
            .bind(&new_link.original_url)
            .bind(&new_link.owner_id)
            .bind(new_link.expires_at)
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::shortcode_taken(json!({ "code": new_link.code }))
                } else {
                    e.into()
                }
            })?;

        Ok(row.into())
    }

    async fn find_resolvable(&self, code: &str) -> Result<Option<Link>, AppError> {
        let query = format!(
            "SELECT {LINK_COLUMNS} FROM links \
             WHERE code = $1 AND deleted_at IS NULL AND is_active \
               AND (expires_at IS NULL OR expires_at > NOW())"
        );

        let row = sqlx::query_as::<_, LinkRow>(&query)
            .bind(code)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Into::into))
    }

    async fn find_by_id(&self, id: i64, owner_id: &str) -> Result<Option<Link>, AppError> {
        let query = format!(
            "SELECT {LINK_COLUMNS} FROM links \
             WHERE id = $1 AND owner_id = $2 AND deleted_at IS NULL"
        );

        let row = sqlx::query_as::<_, LinkRow>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Into::into))
    }

    async fn list(
        &self,
        owner_id: &str,
        filter: LinkFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Link>, AppError> {
        let query = format!(
            "SELECT {LINK_COLUMNS} FROM links \
             WHERE owner_id = $1 AND deleted_at IS NULL \
               AND {STATUS_PREDICATE} AND {TAG_PREDICATE} \
             ORDER BY created_at DESC, id DESC \
             LIMIT $4 OFFSET $5"
        );

        let rows = sqlx::query_as::<_, LinkRow>(&query)
            .bind(owner_id)
            .bind(filter.status.as_str())
            .bind(filter.tag_ids)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count(&self, owner_id: &str, filter: LinkFilter) -> Result<i64, AppError> {
        let query = format!(
            "SELECT COUNT(*) FROM links \
             WHERE owner_id = $1 AND deleted_at IS NULL \
               AND {STATUS_PREDICATE} AND {TAG_PREDICATE}"
        );

        let count: i64 = sqlx::query_scalar(&query)
            .bind(owner_id)
            .bind(filter.status.as_str())
            .bind(filter.tag_ids)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn update(
        &self,
        id: i64,
        owner_id: &str,
        patch: LinkPatch,
    ) -> Result<Option<Link>, AppError> {
        let set_expiry = patch.expires_at.is_some();
        let new_expiry = patch.expires_at.flatten();

        let query = format!(
            "UPDATE links SET \
                 code       = COALESCE($3::TEXT, code), \
                 is_active  = COALESCE($4::BOOLEAN, is_active), \
                 expires_at = CASE WHEN $5 THEN $6::TIMESTAMPTZ ELSE expires_at END, \
                 updated_at = NOW() \
             WHERE id = $1 AND owner_id = $2 AND deleted_at IS NULL \
             RETURNING {LINK_COLUMNS}"
        );

        let row = sqlx::query_as::<_, LinkRow>(&query)
            .bind(id)
            .bind(owner_id)
            .bind(&patch.code)
            .bind(patch.is_active)
            .bind(set_expiry)
            .bind(new_expiry)
            .fetch_optional(self.pool.as_ref())
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::shortcode_taken(json!({ "code": patch.code }))
                } else {
                    e.into()
                }
            })?;

        Ok(row.map(Into::into))
    }

    async fn soft_delete(&self, id: i64, owner_id: &str) -> Result<Option<Link>, AppError> {
        let mut tx = self.pool.begin().await?;

        let query = format!(
            "UPDATE links SET deleted_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND owner_id = $2 AND deleted_at IS NULL \
             RETURNING {LINK_COLUMNS}"
        );

        let row = sqlx::query_as::<_, LinkRow>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(row) = row else {
            tx.rollback().await?;
            return Ok(None);
        };

        // Tombstones carry no tag edges.
        sqlx::query("DELETE FROM link_tags WHERE link_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(row.into()))
    }
}
