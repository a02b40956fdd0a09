//! # Record Cache Repository
//!
//! Last-known value per (record kind, user), mirroring the remote store.
//!
//! ## Cache-as-Backup Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Record Cache Lifecycle                              │
//! │                                                                         │
//! │  WRITE PATH (always, regardless of remote outcome)                     │
//! │       save_income(user, 3000)                                          │
//! │            │                                                            │
//! │            ▼                                                            │
//! │       cache.put(Income, user, "3000", pending = remote failed?)        │
//! │                                                                         │
//! │  READ PATH (only when remote is unreachable)                           │
//! │       cache.get(Income, user) ──► Some(CachedRecord) │ None            │
//! │                                                                         │
//! │  CONFIRM PATH (after successful replay)                                │
//! │       cache.mark_clean(Income, user) ──► pending = 0                   │
//! │                                                                         │
//! │  One row per (kind, user). A put overwrites wholesale - the cache      │
//! │  never holds history, only the latest value.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::StoreResult;
use subtrack_core::RecordKind;

/// A cached value for one record kind of one user.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct CachedRecord {
    /// The JSON value (subscription list or income scalar).
    pub payload: String,

    /// True while a write of this value is still awaiting remote replay.
    pub pending: bool,

    /// When the value was last written.
    pub updated_at: DateTime<Utc>,
}

/// Repository for the record cache.
#[derive(Debug, Clone)]
pub struct CacheRepository {
    pool: SqlitePool,
}

impl CacheRepository {
    /// Creates a new CacheRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CacheRepository { pool }
    }

    /// Stores (or wholesale replaces) the cached value for a record.
    ///
    /// ## Arguments
    /// * `kind` - Record kind being cached
    /// * `user_id` - Owner of the record
    /// * `payload` - JSON serialization of the full value
    /// * `pending` - Whether the value still awaits remote confirmation
    pub async fn put(
        &self,
        kind: RecordKind,
        user_id: &str,
        payload: &str,
        pending: bool,
    ) -> StoreResult<()> {
        let now = Utc::now();

        debug!(kind = %kind, user_id = %user_id, pending, "Caching record");

        sqlx::query(
            r#"
            INSERT INTO record_cache (kind, user_id, payload, pending, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (kind, user_id) DO UPDATE SET
                payload = excluded.payload,
                pending = excluded.pending,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(kind.as_str())
        .bind(user_id)
        .bind(payload)
        .bind(pending)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Reads the cached value for a record.
    ///
    /// ## Returns
    /// `None` when nothing was ever cached - absent data is a valid state,
    /// not an error. Decoding the payload is the caller's concern (and a
    /// payload that fails to decode is treated as absent there too).
    pub async fn get(&self, kind: RecordKind, user_id: &str) -> StoreResult<Option<CachedRecord>> {
        let record = sqlx::query_as::<_, CachedRecord>(
            r#"
            SELECT payload, pending, updated_at
            FROM record_cache
            WHERE kind = ?1 AND user_id = ?2
            "#,
        )
        .bind(kind.as_str())
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Clears the pending flag after the value reached the remote store.
    ///
    /// A no-op when no row exists (the cache may have been rebuilt since
    /// the write was queued).
    pub async fn mark_clean(&self, kind: RecordKind, user_id: &str) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE record_cache SET pending = 0
            WHERE kind = ?1 AND user_id = ?2
            "#,
        )
        .bind(kind.as_str())
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
