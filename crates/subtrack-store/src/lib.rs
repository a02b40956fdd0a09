//! # subtrack-store: Local Storage Layer for SubTrack
//!
//! This crate provides the on-device half of SubTrack's persistence.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SubTrack Data Flow                               │
//! │                                                                         │
//! │  SyncedRepository (subtrack-sync)                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   subtrack-store (THIS CRATE)                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  (cache.rs,   │    │  (embedded)  │  │   │
//! │  │   │               │    │   pending.rs) │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ CacheRepo     │    │ 001_init.sql │  │   │
//! │  │   │ Connection    │    │ PendingRepo   │    │              │  │   │
//! │  │   │ Management    │    │               │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (or :memory: in tests)                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Store error types
//! - [`repository`] - Repository implementations (cache, pending queue)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use subtrack_store::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("subtrack.db")).await?;
//! let cached = db.cache().get(RecordKind::Income, "user-1").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::cache::{CacheRepository, CachedRecord};
pub use repository::pending::PendingWriteRepository;
