//! PostgreSQL implementation of the tag repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

use crate::domain::entities::Tag;
use crate::domain::repositories::TagRepository;
use crate::error::{is_unique_violation, AppError};

const TAG_COLUMNS: &str = "id, name, owner_id, created_at, updated_at";

#[derive(FromRow)]
struct TagRow {
    id: i64,
    name: String,
    owner_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TagRow> for Tag {
    fn from(r: TagRow) -> Self {
        Tag {
            id: r.id,
            name: r.name,
            owner_id: r.owner_id,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// PostgreSQL repository for tags and link-tag edges.
///
/// Association mutations carry their ownership guard in the statement
/// itself: the insert joins link and tag on the owner, so a foreign tag id
/// or a foreign link can never produce an edge, regardless of interleaving.
pub struct PgTagRepository {
    pool: Arc<PgPool>,
}

impl PgTagRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Verifies the link is live and owned, locking the row for the rest of
    /// the transaction so a concurrent soft-delete cannot interleave.
    async fn probe_link(
        &self,
        tx: &mut sqlx::PgTransaction<'_>,
        link_id: i64,
        owner_id: &str,
    ) -> Result<bool, AppError> {
        let found: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM links \
             WHERE id = $1 AND owner_id = $2 AND deleted_at IS NULL FOR SHARE",
        )
        .bind(link_id)
        .bind(owner_id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(found.is_some())
    }
}

#[async_trait]
impl TagRepository for PgTagRepository {
    async fn create(&self, owner_id: &str, name: &str) -> Result<Tag, AppError> {
        let query =
            format!("INSERT INTO tags (name, owner_id) VALUES ($1, $2) RETURNING {TAG_COLUMNS}");

        let row = sqlx::query_as::<_, TagRow>(&query)
            .bind(name)
            .bind(owner_id)
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::tag_name_taken(json!({ "name": name }))
                } else {
                    e.into()
                }
            })?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: i64, owner_id: &str) -> Result<Option<Tag>, AppError> {
        let query = format!("SELECT {TAG_COLUMNS} FROM tags WHERE id = $1 AND owner_id = $2");

        let row = sqlx::query_as::<_, TagRow>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Into::into))
    }

    async fn list(&self, owner_id: &str) -> Result<Vec<Tag>, AppError> {
        let query = format!("SELECT {TAG_COLUMNS} FROM tags WHERE owner_id = $1 ORDER BY name");

        let rows = sqlx::query_as::<_, TagRow>(&query)
            .bind(owner_id)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn rename(&self, id: i64, owner_id: &str, name: &str) -> Result<Option<Tag>, AppError> {
        let query = format!(
            "UPDATE tags SET name = $3, updated_at = NOW() \
             WHERE id = $1 AND owner_id = $2 RETURNING {TAG_COLUMNS}"
        );

        let row = sqlx::query_as::<_, TagRow>(&query)
            .bind(id)
            .bind(owner_id)
            .bind(name)
            .fetch_optional(self.pool.as_ref())
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::tag_name_taken(json!({ "name": name }))
                } else {
                    e.into()
                }
            })?;

        Ok(row.map(Into::into))
    }

    async fn delete(&self, id: i64, owner_id: &str) -> Result<bool, AppError> {
        // Edges go with the tag via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM tags WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn attach(
        &self,
        link_id: i64,
        owner_id: &str,
        tag_ids: &[i64],
    ) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        if !self.probe_link(&mut tx, link_id, owner_id).await? {
            tx.rollback().await?;
            return Ok(false);
        }

        // The owner join is the enforcement: tag ids not owned by `owner_id`
        // simply select no rows. Existing edges are absorbed by the conflict
        // clause, making the operation idempotent.
        sqlx::query(
            "INSERT INTO link_tags (link_id, tag_id) \
             SELECT l.id, t.id FROM links l \
             JOIN tags t ON t.owner_id = l.owner_id \
             WHERE l.id = $1 AND l.owner_id = $2 AND l.deleted_at IS NULL \
               AND t.id = ANY($3) \
             ON CONFLICT DO NOTHING",
        )
        .bind(link_id)
        .bind(owner_id)
        .bind(tag_ids.to_vec())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(true)
    }

    async fn detach(
        &self,
        link_id: i64,
        owner_id: &str,
        tag_ids: &[i64],
    ) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        if !self.probe_link(&mut tx, link_id, owner_id).await? {
            tx.rollback().await?;
            return Ok(false);
        }

        // Absent edges delete zero rows; that is the idempotent no-op.
        sqlx::query(
            "DELETE FROM link_tags lt USING links l \
             WHERE lt.link_id = l.id AND l.id = $1 AND l.owner_id = $2 \
               AND lt.tag_id = ANY($3)",
        )
        .bind(link_id)
        .bind(owner_id)
        .bind(tag_ids.to_vec())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(true)
    }

    async fn tags_for_link(&self, link_id: i64, owner_id: &str) -> Result<Vec<Tag>, AppError> {
        let rows = sqlx::query_as::<_, TagRow>(
            "SELECT t.id, t.name, t.owner_id, t.created_at, t.updated_at \
             FROM tags t \
             JOIN link_tags lt ON lt.tag_id = t.id \
             WHERE lt.link_id = $1 AND t.owner_id = $2 \
             ORDER BY t.name",
        )
        .bind(link_id)
        .bind(owner_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
