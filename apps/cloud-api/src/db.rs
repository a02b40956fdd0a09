//! Database layer for the Cloud API.
//!
//! SQLite-backed storage for user accounts and their record documents.
//!
//! ## Schema
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cloud API Schema                                 │
//! │                                                                         │
//! │  users                            documents                             │
//! │  ─────                            ─────────                             │
//! │  id TEXT PK                       user_id TEXT ┐                        │
//! │  name TEXT                        kind TEXT    ┴ PK (user_id, kind)    │
//! │  email TEXT UNIQUE                payload TEXT (JSON)                   │
//! │  provider TEXT                    updated_at                            │
//! │  password_hash TEXT NULL                                                │
//! │  federated_provider TEXT NULL     One document per record kind per     │
//! │  federated_subject TEXT NULL      user; PUT replaces it wholesale.     │
//! │  created_at                                                             │
//! │  last_login NULL                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::info;

use crate::error::CloudError;
use subtrack_core::RecordKind;

// =============================================================================
// Records
// =============================================================================

/// A stored user account.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    /// "password" or "federated"
    pub provider: String,
    pub password_hash: Option<String>,
    pub federated_provider: Option<String>,
    pub federated_subject: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// A stored record document.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DocumentRow {
    pub payload: String,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Database
// =============================================================================

/// Database connection pool.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to the database and create the schema.
    pub async fn connect(path: &str) -> Result<Self, CloudError> {
        let options = if path == ":memory:" {
            SqliteConnectOptions::new().in_memory(true)
        } else {
            SqliteConnectOptions::from_str(&format!("sqlite://{}?mode=rwc", path))
                .map_err(|e| CloudError::Database(e.to_string()))?
                .create_if_missing(true)
        };

        let options = options
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true);

        // In-memory databases vanish per-connection, so keep exactly one
        let max_connections = if path == ":memory:" { 1 } else { 10 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| CloudError::Database(e.to_string()))?;

        let db = Database { pool };
        db.init_schema().await?;
        info!(path = %path, "Cloud database ready");

        Ok(db)
    }

    /// Create tables if they don't exist.
    async fn init_schema(&self) -> Result<(), CloudError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id                 TEXT PRIMARY KEY,
                name               TEXT NOT NULL,
                email              TEXT NOT NULL UNIQUE,
                provider           TEXT NOT NULL,
                password_hash      TEXT,
                federated_provider TEXT,
                federated_subject  TEXT,
                created_at         TEXT NOT NULL,
                last_login         TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                user_id    TEXT NOT NULL,
                kind       TEXT NOT NULL,
                payload    TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (user_id, kind)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Check database connectivity.
    pub async fn health_check(&self) -> Result<(), CloudError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // =========================================================================
    // User Operations
    // =========================================================================

    /// Insert a new user account.
    pub async fn create_user(&self, user: &UserRow) -> Result<(), CloudError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (
                id, name, email, provider, password_hash,
                federated_provider, federated_subject, created_at, last_login
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.provider)
        .bind(&user.password_hash)
        .bind(&user.federated_provider)
        .bind(&user.federated_subject)
        .bind(user.created_at)
        .bind(user.last_login)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(CloudError::Conflict(
                "An account with this email already exists".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Find a user by login email.
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRow>, CloudError> {
        let user = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, provider, password_hash,
                   federated_provider, federated_subject, created_at, last_login
            FROM users
            WHERE email = ?1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find a user by id.
    pub async fn find_user_by_id(&self, id: &str) -> Result<Option<UserRow>, CloudError> {
        let user = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, provider, password_hash,
                   federated_provider, federated_subject, created_at, last_login
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Record a successful login.
    pub async fn touch_last_login(&self, user_id: &str) -> Result<(), CloudError> {
        sqlx::query("UPDATE users SET last_login = ?2 WHERE id = ?1")
            .bind(user_id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    // =========================================================================
    // Document Operations
    // =========================================================================

    /// Read a user's record document.
    pub async fn get_document(
        &self,
        user_id: &str,
        kind: RecordKind,
    ) -> Result<Option<DocumentRow>, CloudError> {
        let doc = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT payload, updated_at
            FROM documents
            WHERE user_id = ?1 AND kind = ?2
            "#,
        )
        .bind(user_id)
        .bind(kind.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(doc)
    }

    /// Wholesale-replace a user's record document.
    pub async fn put_document(
        &self,
        user_id: &str,
        kind: RecordKind,
        payload: &str,
    ) -> Result<(), CloudError> {
        sqlx::query(
            r#"
            INSERT INTO documents (user_id, kind, payload, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (user_id, kind) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(user_id)
        .bind(kind.as_str())
        .bind(payload)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    async fn db() -> Database {
        Database::connect(":memory:").await.unwrap()
    }

    fn user(id: &str, email: &str) -> UserRow {
        UserRow {
            id: id.to_string(),
            name: "Test User".to_string(),
            email: email.to_string(),
            provider: "password".to_string(),
            password_hash: Some("hash".to_string()),
            federated_provider: None,
            federated_subject: None,
            created_at: Utc::now(),
            last_login: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_find_user() {
        let db = db().await;
        db.create_user(&user("u1", "a@example.com")).await.unwrap();

        let found = db.find_user_by_email("a@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, "u1");
        assert!(db.find_user_by_email("b@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let db = db().await;
        db.create_user(&user("u1", "a@example.com")).await.unwrap();

        let err = db.create_user(&user("u2", "a@example.com")).await.unwrap_err();
        assert!(matches!(err, CloudError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_touch_last_login() {
        let db = db().await;
        db.create_user(&user("u1", "a@example.com")).await.unwrap();
        db.touch_last_login("u1").await.unwrap();

        let found = db.find_user_by_id("u1").await.unwrap().unwrap();
        assert!(found.last_login.is_some());
    }

    #[tokio::test]
    async fn test_document_put_overwrites() {
        let db = db().await;

        db.put_document("u1", RecordKind::Income, "100").await.unwrap();
        db.put_document("u1", RecordKind::Income, "200").await.unwrap();

        let doc = db.get_document("u1", RecordKind::Income).await.unwrap().unwrap();
        assert_eq!(doc.payload, "200");
        assert!(db.get_document("u1", RecordKind::Subscriptions).await.unwrap().is_none());
    }
}
