//! # SubTrack Cloud API
//!
//! HTTP server holding the authoritative copy of every user's records.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Cloud API Surface                               │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────────────┐  ┌──────────────────┐  │
//! │  │  Auth          │  │  Records               │  │  Health          │  │
//! │  │                │  │                        │  │                  │  │
//! │  │ • register     │  │ • GET/PUT              │  │ • liveness       │  │
//! │  │ • login        │  │   …/subscriptions      │  │ • db check       │  │
//! │  │ • refresh      │  │ • GET/PUT …/income     │  │                  │  │
//! │  └────────────────┘  └────────────────────────┘  └──────────────────┘  │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      Infrastructure                               │  │
//! │  │                                                                   │  │
//! │  │  ┌──────────────┐  ┌──────────────────────────────────────────┐  │  │
//! │  │  │  SQLite      │  │    JWT Auth                              │  │  │
//! │  │  │              │  │                                          │  │  │
//! │  │  │ users +      │  │ access/refresh tokens, argon2-hashed    │  │  │
//! │  │  │ documents    │  │ password and federated credentials       │  │  │
//! │  │  └──────────────┘  └──────────────────────────────────────────┘  │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `HTTP_PORT` - HTTP server port (default: 8080)
//! - `DATABASE_PATH` - SQLite database path (default: cloud.db)
//! - `JWT_SECRET` - Secret for JWT signing
//! - `JWT_ACCESS_LIFETIME_SECS` - Access token lifetime (default: 3600)
//! - `JWT_REFRESH_LIFETIME_SECS` - Refresh token lifetime (default: 604800)

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod routes;

// Re-exports
pub use config::CloudConfig;
pub use db::Database;
pub use error::CloudError;

/// Shared application state.
pub struct AppState {
    pub db: Database,
    pub jwt: auth::JwtManager,
    pub config: CloudConfig,
}
