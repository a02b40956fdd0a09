//! # subtrack-sync: Offline-Tolerant Synced Data Access
//!
//! This crate serves reads and writes against whichever of {remote store,
//! local cache} is reachable, tracks connectivity, queues writes made while
//! offline, and replays them once connectivity returns - without duplicating
//! or losing writes.
//!
//! ## The Core Loop
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Offline-Tolerant Write Path                           │
//! │                                                                         │
//! │  save_income(user, 3000)                                               │
//! │       │                                                                 │
//! │       ├── Online? ── attempt RemoteStore.set_income ──┐                │
//! │       │                                               │                │
//! │       │              ┌── success ────────────────────┤                │
//! │       │              │   cache.put(pending = false)   │                │
//! │       │              │   → Synced { offline: false }  │                │
//! │       │              │                                │                │
//! │       │              └── failure ────────────────────┤                │
//! │       │                  state → Offline              │                │
//! │       └── Offline ──────────────────────────────────┤                │
//! │                          cache.put(pending = true)    │                │
//! │                          queue.enqueue(PendingWrite)  │                │
//! │                          → Synced { offline: true }   │                │
//! │                                                       │                │
//! │  The caller NEVER sees a hard error for a transport failure: local    │
//! │  durability was achieved, so the write is logically applied.          │
//! │                                                                         │
//! │  Offline → Online (connectivity signal or call outcome):               │
//! │       ReplayWorker drains the queue strictly in enqueue order          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`repository`] - `SyncedRepository`: the load/save/drain surface
//! - [`remote`] - `RemoteStore` trait boundary + in-memory implementation
//! - [`client`] - HTTP implementation of `RemoteStore` (reqwest)
//! - [`connectivity`] - Online ⇄ Offline state, watch-channel based
//! - [`replay`] - Background worker that drains the queue on reconnect
//! - [`config`] - Sync configuration (TOML file + env overrides)
//! - [`error`] - Sync error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use subtrack_store::{Database, DbConfig};
//! use subtrack_sync::{Connectivity, HttpRemoteStore, ReplayWorker, SyncedRepository};
//!
//! let db = Database::new(DbConfig::new("subtrack.db")).await?;
//! let remote = Arc::new(HttpRemoteStore::new("https://api.example.com", None)?);
//! let repo = Arc::new(SyncedRepository::new(remote, db, Connectivity::online()));
//!
//! let (worker, handle) = ReplayWorker::new(repo.clone());
//! tokio::spawn(worker.run());
//!
//! let loaded = repo.load_subscriptions("user-1").await?;
//! if loaded.offline {
//!     // show the "working offline" notice
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod client;
pub mod config;
pub mod connectivity;
pub mod error;
pub mod remote;
pub mod replay;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use client::HttpRemoteStore;
pub use config::SyncConfig;
pub use connectivity::{ConnectionState, Connectivity};
pub use error::{SyncError, SyncResult};
pub use remote::{MemoryRemoteStore, RemoteResult, RemoteStore, RemoteUnreachable};
pub use replay::{ReplayWorker, ReplayWorkerHandle};
pub use repository::{DrainReport, Synced, SyncedRepository};
