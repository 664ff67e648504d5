//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Link, LinkChanges, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::db_error::{LINKS_HASH_CONSTRAINT, is_unique_violation_on};

const LINK_COLUMNS: &str = "id, hash, original_url, creator_id, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct LinkRow {
    id: i64,
    hash: Option<String>,
    original_url: String,
    creator_id: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<LinkRow> for Link {
    fn from(r: LinkRow) -> Self {
        Link::new(
            r.id,
            r.hash,
            r.original_url,
            r.creator_id,
            r.created_at,
            r.updated_at,
        )
    }
}

/// PostgreSQL repository for link storage and retrieval.
///
/// Uses bound parameters for every value; no SQL is built from user input.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

fn map_write_error(e: sqlx::Error, hash: Option<&str>) -> AppError {
    if is_unique_violation_on(&e, LINKS_HASH_CONSTRAINT) {
        return AppError::conflict("Hash is already in use", json!({ "hash": hash }));
    }

    e.into()
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let query = format!(
            "INSERT INTO links (hash, original_url, creator_id) VALUES ($1, $2, $3) RETURNING {}",
            LINK_COLUMNS
        );

        let row = sqlx::query_as::<_, LinkRow>(&query)
            .bind(&new_link.hash)
            .bind(&new_link.original_url)
            .bind(new_link.creator_id)
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(|e| map_write_error(e, new_link.hash.as_deref()))?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Link>, AppError> {
        let query = format!("SELECT {} FROM links WHERE id = $1", LINK_COLUMNS);

        let row = sqlx::query_as::<_, LinkRow>(&query)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Link::from))
    }

    async fn find_by_hash(&self, hash: &str) -> Result<Option<Link>, AppError> {
        let query = format!("SELECT {} FROM links WHERE hash = $1", LINK_COLUMNS);

        let row = sqlx::query_as::<_, LinkRow>(&query)
            .bind(hash)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Link::from))
    }

    async fn find_by_original_url(&self, original_url: &str) -> Result<Option<Link>, AppError> {
        let query = format!(
            "SELECT {} FROM links WHERE original_url = $1 ORDER BY id ASC LIMIT 1",
            LINK_COLUMNS
        );

        let row = sqlx::query_as::<_, LinkRow>(&query)
            .bind(original_url)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Link::from))
    }

    async fn find_unbranded_by_original_url(
        &self,
        original_url: &str,
        creator_id: Option<i64>,
    ) -> Result<Option<Link>, AppError> {
        let query = format!(
            "SELECT {} FROM links \
             WHERE original_url = $1 AND hash IS NULL AND creator_id IS NOT DISTINCT FROM $2 \
             ORDER BY id ASC LIMIT 1",
            LINK_COLUMNS
        );

        let row = sqlx::query_as::<_, LinkRow>(&query)
            .bind(original_url)
            .bind(creator_id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Link::from))
    }

    async fn list_by_creator(&self, creator_id: i64) -> Result<Vec<Link>, AppError> {
        let query = format!(
            "SELECT {} FROM links WHERE creator_id = $1 ORDER BY created_at DESC, id DESC",
            LINK_COLUMNS
        );

        let rows = sqlx::query_as::<_, LinkRow>(&query)
            .bind(creator_id)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(Link::from).collect())
    }

    async fn update(&self, id: i64, changes: LinkChanges) -> Result<Link, AppError> {
        // $2 flags whether the hash changes at all, so NULL can mean "clear".
        let query = format!(
            r#"
            UPDATE links
            SET hash = CASE WHEN $2 THEN $3 ELSE hash END,
                original_url = COALESCE($4, original_url),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            LINK_COLUMNS
        );

        let hash_changed = changes.hash.is_some();
        let new_hash = changes.hash.flatten();

        let row = sqlx::query_as::<_, LinkRow>(&query)
            .bind(id)
            .bind(hash_changed)
            .bind(&new_hash)
            .bind(&changes.original_url)
            .fetch_optional(self.pool.as_ref())
            .await
            .map_err(|e| map_write_error(e, new_hash.as_deref()))?;

        row.map(Link::from)
            .ok_or_else(|| AppError::not_found("Link not found", json!({ "id": id })))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM links WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }
}
