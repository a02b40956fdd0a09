//! # Pending-Write Queue Repository
//!
//! Stores writes that could not reach the remote store, for later replay.
//!
//! ## The Queue Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Pending-Write Queue                                  │
//! │                                                                         │
//! │  id   | kind          | user_id | payload  | attempts | enqueued_at    │
//! │  ─────┼───────────────┼─────────┼──────────┼──────────┼─────────────── │
//! │  a3.. │ income        │ user-1  │ 300000   │ 0        │ 12:00:01       │
//! │  b7.. │ subscriptions │ user-1  │ [..gym]  │ 0        │ 12:00:05       │
//! │  c1.. │ subscriptions │ user-1  │ []       │ 1        │ 12:00:09       │
//! │                                                                         │
//! │  ORDER:  replay order = enqueue order (oldest first)                   │
//! │  DEDUP:  none - both subscription writes above replay; the later one  │
//! │          wins at the store, which is exactly last-write-wins          │
//! │  CONSUME: DELETE on successful replay, exactly once                    │
//! │  FAILURE: attempts += 1, last_error recorded, entry stays queued       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use subtrack_core::{PendingWrite, RecordKind};

/// Raw row shape; `kind` is parsed into [`RecordKind`] on the way out.
#[derive(Debug, sqlx::FromRow)]
struct PendingWriteRow {
    id: String,
    kind: String,
    user_id: String,
    payload: String,
    attempts: i64,
    last_error: Option<String>,
    enqueued_at: DateTime<Utc>,
}

impl TryFrom<PendingWriteRow> for PendingWrite {
    type Error = StoreError;

    fn try_from(row: PendingWriteRow) -> Result<Self, Self::Error> {
        let kind: RecordKind = row
            .kind
            .parse()
            .map_err(|_| StoreError::Internal(format!("unknown record kind '{}'", row.kind)))?;

        Ok(PendingWrite {
            id: row.id,
            kind,
            user_id: row.user_id,
            payload: row.payload,
            attempts: row.attempts,
            last_error: row.last_error,
            enqueued_at: row.enqueued_at,
        })
    }
}

/// Repository for the pending-write queue.
#[derive(Debug, Clone)]
pub struct PendingWriteRepository {
    pool: SqlitePool,
}

impl PendingWriteRepository {
    /// Creates a new PendingWriteRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PendingWriteRepository { pool }
    }

    /// Queues a write for replay.
    pub async fn enqueue(&self, write: &PendingWrite) -> StoreResult<()> {
        debug!(
            id = %write.id,
            kind = %write.kind,
            user_id = %write.user_id,
            "Queuing write for replay"
        );

        sqlx::query(
            r#"
            INSERT INTO pending_writes (
                id, kind, user_id, payload, attempts, last_error, enqueued_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&write.id)
        .bind(write.kind.as_str())
        .bind(&write.user_id)
        .bind(&write.payload)
        .bind(write.attempts)
        .bind(&write.last_error)
        .bind(write.enqueued_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Returns all queued writes, oldest first.
    ///
    /// The rowid tiebreak keeps two writes enqueued in the same instant in
    /// insertion order.
    pub async fn oldest_first(&self) -> StoreResult<Vec<PendingWrite>> {
        let rows = sqlx::query_as::<_, PendingWriteRow>(
            r#"
            SELECT id, kind, user_id, payload, attempts, last_error, enqueued_at
            FROM pending_writes
            ORDER BY enqueued_at ASC, rowid ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(PendingWrite::try_from).collect()
    }

    /// Removes a queued write after successful replay.
    ///
    /// This is the "consumed exactly once" half of the queue contract.
    pub async fn remove(&self, id: &str) -> StoreResult<()> {
        sqlx::query("DELETE FROM pending_writes WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Records a replay failure; the entry stays queued.
    pub async fn mark_failed(&self, id: &str, error: &str) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE pending_writes SET
                attempts = attempts + 1,
                last_error = ?2
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(error)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Counts queued writes.
    pub async fn count(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pending_writes")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_enqueue_preserves_order() {
        let db = db().await;
        let queue = db.pending_writes();

        let first = PendingWrite::new(RecordKind::Income, "user-1", "300000");
        let second = PendingWrite::new(RecordKind::Subscriptions, "user-1", "[]");
        let third = PendingWrite::new(RecordKind::Income, "user-1", "310000");

        for w in [&first, &second, &third] {
            queue.enqueue(w).await.unwrap();
        }

        let queued = queue.oldest_first().await.unwrap();
        assert_eq!(
            queued.iter().map(|w| w.id.as_str()).collect::<Vec<_>>(),
            vec![first.id.as_str(), second.id.as_str(), third.id.as_str()]
        );
    }

    #[tokio::test]
    async fn test_no_dedup_by_kind() {
        let db = db().await;
        let queue = db.pending_writes();

        queue
            .enqueue(&PendingWrite::new(RecordKind::Income, "user-1", "1"))
            .await
            .unwrap();
        queue
            .enqueue(&PendingWrite::new(RecordKind::Income, "user-1", "2"))
            .await
            .unwrap();

        // Both survive; replay applies them in order and the store keeps "2"
        assert_eq!(queue.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_remove_consumes_exactly_once() {
        let db = db().await;
        let queue = db.pending_writes();

        let w = PendingWrite::new(RecordKind::Subscriptions, "user-1", "[]");
        queue.enqueue(&w).await.unwrap();

        queue.remove(&w.id).await.unwrap();
        assert_eq!(queue.count().await.unwrap(), 0);

        // Removing again is harmless
        queue.remove(&w.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_mark_failed_bumps_attempts() {
        let db = db().await;
        let queue = db.pending_writes();

        let w = PendingWrite::new(RecordKind::Income, "user-1", "100");
        queue.enqueue(&w).await.unwrap();

        queue.mark_failed(&w.id, "remote unreachable").await.unwrap();
        queue.mark_failed(&w.id, "still unreachable").await.unwrap();

        let queued = queue.oldest_first().await.unwrap();
        assert_eq!(queued[0].attempts, 2);
        assert_eq!(queued[0].last_error.as_deref(), Some("still unreachable"));
    }
}
