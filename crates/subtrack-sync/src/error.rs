//! # Sync Error Types
//!
//! Error types for sync operations.
//!
//! ## What Reaches Callers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Sync Error Philosophy                               │
//! │                                                                         │
//! │  Remote transport failure   → NOT an error. Degrades to the cache     │
//! │                               and the pending queue (offline: true).  │
//! │  Corrupt cached payload     → NOT an error. Treated as absent data.   │
//! │  Write with empty user id   → NOT an error. A logged no-op.           │
//! │                                                                         │
//! │  Local store failure        → SyncError::Store (the one path where    │
//! │                               durability genuinely wasn't achieved)   │
//! │  Bad configuration          → SyncError::InvalidConfig / Config*      │
//! │  Un-encodable value         → SyncError::Serialization               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use subtrack_store::StoreError;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Sync error type.
#[derive(Debug, Error)]
pub enum SyncError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid sync configuration.
    #[error("Invalid sync configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    /// Failed to build the HTTP client for the remote store.
    #[error("Failed to build remote client: {0}")]
    RemoteClientFailed(String),

    // =========================================================================
    // Local Store Errors
    // =========================================================================
    /// The local cache or queue failed; local durability was NOT achieved.
    #[error("Local store error: {0}")]
    Store(#[from] StoreError),

    // =========================================================================
    // Encoding Errors
    // =========================================================================
    /// A value could not be serialized for caching or queueing.
    #[error("Serialization failed: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Serialization(err.to_string())
    }
}
