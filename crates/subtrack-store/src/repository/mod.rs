//! # Repository Implementations
//!
//! Data access repositories for the local store.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Repository Pattern                                  │
//! │                                                                         │
//! │  SyncedRepository (subtrack-sync)                                      │
//! │       │                                                                 │
//! │       ├──► db.cache()           CacheRepository                        │
//! │       │                         put / get / mark_clean                 │
//! │       │                                                                 │
//! │       └──► db.pending_writes()  PendingWriteRepository                 │
//! │                                 enqueue / oldest_first / remove        │
//! │                                                                         │
//! │  SQL lives here and only here. Callers never see a storage key or    │
//! │  a table name - that format is an implementation detail.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cache;
pub mod pending;
