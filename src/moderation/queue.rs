/// Pending post queue
///
/// Ordered holding area for drafts awaiting a super admin decision. A
/// record exists only between submission and decision; decisions delete
/// it rather than flag it.
use crate::error::{PortalError, PortalResult};
use crate::moderation::draft::PostType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};

/// Queued draft awaiting moderation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingPost {
    pub id: i64,
    pub post_type: PostType,
    /// Serialized DraftContent snapshot, reproduced exactly on approval
    pub content: String,
    /// Submitting admin, by reference; the admin may be deleted while
    /// the draft is queued
    pub admin_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Pending queue manager
#[derive(Clone)]
pub struct PendingQueue {
    db: SqlitePool,
}

impl PendingQueue {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Append a draft snapshot to the queue
    pub async fn enqueue(
        &self,
        post_type: PostType,
        content: &str,
        admin_id: i64,
    ) -> PortalResult<PendingPost> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO pending_post (post_type, content, admin_id, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(post_type.as_str())
        .bind(content)
        .bind(admin_id)
        .bind(now.to_rfc3339())
        .execute(&self.db)
        .await?;

        Ok(PendingPost {
            id: result.last_insert_rowid(),
            post_type,
            content: content.to_string(),
            admin_id,
            created_at: now,
        })
    }

    /// Get a pending post by id
    pub async fn get(&self, id: i64) -> PortalResult<Option<PendingPost>> {
        let row = sqlx::query(
            r#"
            SELECT id, post_type, content, admin_id, created_at
            FROM pending_post
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        row.map(parse_pending_post).transpose()
    }

    /// Delete a pending post. Returns whether a row was removed, so the
    /// caller can detect a concurrent decision on the same id.
    pub async fn delete(&self, id: i64) -> PortalResult<bool> {
        let result = sqlx::query("DELETE FROM pending_post WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List all queued drafts in insertion order
    pub async fn list_all(&self) -> PortalResult<Vec<PendingPost>> {
        let rows = sqlx::query(
            r#"
            SELECT id, post_type, content, admin_id, created_at
            FROM pending_post
            ORDER BY id
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(parse_pending_post).collect()
    }

    /// Number of queued drafts
    pub async fn depth(&self) -> PortalResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pending_post")
            .fetch_one(&self.db)
            .await?;

        Ok(count)
    }
}

pub(crate) fn parse_pending_post(row: sqlx::sqlite::SqliteRow) -> PortalResult<PendingPost> {
    let post_type_str: String = row.get("post_type");
    let post_type = PostType::from_str(&post_type_str)?;

    let created_at_str: String = row.get("created_at");
    let created_at = DateTime::parse_from_rfc3339(&created_at_str)
        .map_err(|e| PortalError::Internal(format!("Invalid timestamp: {}", e)))?
        .with_timezone(&Utc);

    Ok(PendingPost {
        id: row.get("id"),
        post_type,
        content: row.get("content"),
        admin_id: row.get("admin_id"),
        created_at,
    })
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let db = SqlitePool::connect(":memory:").await.unwrap();

    sqlx::query(
        r#"
        CREATE TABLE pending_post (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            post_type TEXT NOT NULL,
            content TEXT NOT NULL,
            admin_id INTEGER NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(&db)
    .await
    .unwrap();

    db
}
