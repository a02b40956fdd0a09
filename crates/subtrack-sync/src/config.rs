//! # Sync Configuration
//!
//! Configuration for the synced data-access layer.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     SUBTRACK_REMOTE_URL=https://api.subtrack.example                   │
//! │     SUBTRACK_DEVICE_ID=abc-123                                         │
//! │     SUBTRACK_DB_PATH=/var/lib/subtrack/subtrack.db                     │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/subtrack/sync.toml (Linux)                               │
//! │     ~/Library/Application Support/com.subtrack.app/sync.toml (macOS)   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     auto-generated device_id, no remote (isolated mode)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # sync.toml
//! [device]
//! id = "550e8400-e29b-41d4-a716-446655440000"
//! name = "Living Room Laptop"
//!
//! [remote]
//! base_url = "https://api.subtrack.example"
//! request_timeout_secs = 10
//! assume_online_at_start = true
//!
//! [storage]
//! db_path = "subtrack.db"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{SyncError, SyncResult};

// =============================================================================
// Device Configuration
// =============================================================================

/// Configuration for this device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Unique device identifier (UUID v4).
    /// Auto-generated on first run if not provided.
    #[serde(default = "default_device_id")]
    pub id: String,

    /// Human-readable device name (e.g., "Living Room Laptop").
    #[serde(default = "default_device_name")]
    pub name: String,
}

fn default_device_id() -> String {
    Uuid::new_v4().to_string()
}

fn default_device_name() -> String {
    "SubTrack Device".to_string()
}

impl Default for DeviceConfig {
    fn default() -> Self {
        DeviceConfig {
            id: default_device_id(),
            name: default_device_name(),
        }
    }
}

// =============================================================================
// Remote Settings
// =============================================================================

/// Remote store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteSettings {
    /// Base URL of the cloud API (e.g., `https://api.subtrack.example`).
    /// `None` runs the app in isolated mode: local store only, no replay.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Per-request timeout (seconds). Short on purpose: a hung request
    /// delays the offline fallback the caller is waiting on.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Initial connectivity assumption before the first call settles it.
    #[serde(default = "default_true")]
    pub assume_online_at_start: bool,

    /// Interval between replay retry ticks (seconds).
    #[serde(default = "default_retry_interval")]
    pub retry_interval_secs: u64,
}

fn default_request_timeout() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

fn default_retry_interval() -> u64 {
    30
}

impl Default for RemoteSettings {
    fn default() -> Self {
        RemoteSettings {
            base_url: None,
            request_timeout_secs: default_request_timeout(),
            assume_online_at_start: true,
            retry_interval_secs: default_retry_interval(),
        }
    }
}

// =============================================================================
// Storage Settings
// =============================================================================

/// Local storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

fn default_db_path() -> String {
    "subtrack.db".to_string()
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            db_path: default_db_path(),
        }
    }
}

// =============================================================================
// Main Sync Configuration
// =============================================================================

/// Complete sync configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Device-specific configuration.
    #[serde(default)]
    pub device: DeviceConfig,

    /// Remote store settings.
    #[serde(default)]
    pub remote: RemoteSettings,

    /// Local storage settings.
    #[serde(default)]
    pub storage: StorageSettings,
}

impl SyncConfig {
    /// Creates a new config with defaults and a generated device ID.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (sync.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SyncResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading sync config from file");
                let contents = std::fs::read_to_string(&path)
                    .map_err(|e| SyncError::ConfigLoadFailed(e.to_string()))?;
                config = toml::from_str(&contents)
                    .map_err(|e| SyncError::ConfigLoadFailed(e.to_string()))?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load sync config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> SyncResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SyncError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SyncError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| SyncError::ConfigSaveFailed(e.to_string()))?;
        std::fs::write(&path, contents).map_err(|e| SyncError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Sync config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SyncResult<()> {
        if self.device.id.is_empty() {
            return Err(SyncError::InvalidConfig("device.id must not be empty".into()));
        }

        if let Some(ref url) = self.remote.base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(SyncError::InvalidConfig(format!(
                    "Remote URL must start with http:// or https://, got: {}",
                    url
                )));
            }
        }

        if self.remote.request_timeout_secs == 0 {
            return Err(SyncError::InvalidConfig(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(id) = std::env::var("SUBTRACK_DEVICE_ID") {
            debug!(device_id = %id, "Overriding device ID from environment");
            self.device.id = id;
        }

        if let Ok(url) = std::env::var("SUBTRACK_REMOTE_URL") {
            debug!(url = %url, "Overriding remote URL from environment");
            self.remote.base_url = Some(url);
        }

        if let Ok(path) = std::env::var("SUBTRACK_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.storage.db_path = path;
        }
    }

    /// Default config file path for this platform.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "subtrack", "app")
            .map(|dirs| dirs.config_dir().join("sync.toml"))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SyncConfig::new();
        assert!(config.remote.base_url.is_none());
        assert!(config.remote.assume_online_at_start);
        assert!(!config.device.id.is_empty());
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: SyncConfig = toml::from_str(
            r#"
            [remote]
            base_url = "https://api.subtrack.example"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.remote.base_url.as_deref(),
            Some("https://api.subtrack.example")
        );
        assert_eq!(config.remote.request_timeout_secs, 10);
        assert_eq!(config.storage.db_path, "subtrack.db");
    }

    #[test]
    fn test_device_table_without_id_generates_one() {
        let config: SyncConfig = toml::from_str(
            r#"
            [device]
            name = "Living Room Laptop"
            "#,
        )
        .unwrap();

        assert_eq!(config.device.name, "Living Room Laptop");
        assert!(!config.device.id.is_empty());
        config.validate().unwrap();
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = SyncConfig::new();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: SyncConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.device.id, config.device.id);
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut config = SyncConfig::new();
        config.remote.base_url = Some("ftp://example.com".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = SyncConfig::new();
        config.remote.request_timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
