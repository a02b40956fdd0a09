//! # HTTP Remote Store
//!
//! [`RemoteStore`] implementation over the SubTrack cloud API.
//!
//! ## Endpoint Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      HttpRemoteStore                                    │
//! │                                                                         │
//! │  get_subscriptions ──► GET {base}/users/{id}/subscriptions             │
//! │  set_subscriptions ──► PUT {base}/users/{id}/subscriptions             │
//! │                        body: bare JSON array of subscriptions           │
//! │                                                                         │
//! │  get_income        ──► GET {base}/users/{id}/income                    │
//! │  set_income        ──► PUT {base}/users/{id}/income                    │
//! │                        body: { "income": <cents> }                      │
//! │                                                                         │
//! │  RESULT FOLDING (the whole point of this boundary):                    │
//! │    2xx            → Ok(value)  (the API itself serves [] / zero for    │
//! │                                 users who never saved)                  │
//! │    any other status, timeout, DNS, refused, bad body                   │
//! │                   → Err(RemoteUnreachable)                              │
//! │                                                                         │
//! │  The repository treats every Err identically (degrade to cache), so    │
//! │  this client never needs a finer-grained error type.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use subtrack_core::{Money, Subscription};

use crate::error::{SyncError, SyncResult};
use crate::remote::{RemoteResult, RemoteStore, RemoteUnreachable};

// =============================================================================
// Constants
// =============================================================================

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// Wire Types
// =============================================================================

/// Wire shape for the income document.
#[derive(Debug, Serialize, Deserialize)]
struct IncomeBody {
    income: Money,
}

// =============================================================================
// HTTP Client
// =============================================================================

/// HTTP-backed [`RemoteStore`] talking to the SubTrack cloud API.
#[derive(Debug, Clone)]
pub struct HttpRemoteStore {
    client: reqwest::Client,
    base_url: String,
    /// Bearer token for authenticated deployments.
    token: Option<String>,
}

impl HttpRemoteStore {
    /// Creates a client with the default request timeout.
    ///
    /// ## Arguments
    /// * `base_url` - Base URL of the cloud API (e.g., `https://api.subtrack.example`)
    /// * `token` - Optional bearer token for authenticated requests
    pub fn new(base_url: &str, token: Option<String>) -> SyncResult<Self> {
        Self::with_timeout(base_url, token, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a client with an explicit request timeout.
    pub fn with_timeout(
        base_url: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> SyncResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::RemoteClientFailed(e.to_string()))?;

        Ok(HttpRemoteStore {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn record_url(&self, user_id: &str, record: &str) -> String {
        format!(
            "{}/users/{}/{}",
            self.base_url,
            urlencoding::encode(user_id),
            record
        )
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// GET a record document. The API serves an empty document for users
    /// who never saved, so every success carries a value.
    async fn get_record<T: serde::de::DeserializeOwned>(
        &self,
        user_id: &str,
        record: &str,
    ) -> RemoteResult<T> {
        let url = self.record_url(user_id, record);
        debug!(url = %url, "GET record");

        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|e| RemoteUnreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteUnreachable(format!("{url} returned {status}")));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| RemoteUnreachable(format!("malformed response body: {e}")))
    }

    /// PUT a record document.
    async fn put_record<T: Serialize>(
        &self,
        user_id: &str,
        record: &str,
        body: &T,
    ) -> RemoteResult<()> {
        let url = self.record_url(user_id, record);
        debug!(url = %url, "PUT record");

        let response = self
            .authorize(self.client.put(&url))
            .json(body)
            .send()
            .await
            .map_err(|e| RemoteUnreachable(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(RemoteUnreachable(format!("{url} returned {status}")))
        }
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn get_subscriptions(&self, user_id: &str) -> RemoteResult<Option<Vec<Subscription>>> {
        let subscriptions: Vec<Subscription> = self.get_record(user_id, "subscriptions").await?;
        Ok(Some(subscriptions))
    }

    async fn set_subscriptions(
        &self,
        user_id: &str,
        subscriptions: &[Subscription],
    ) -> RemoteResult<()> {
        self.put_record(user_id, "subscriptions", &subscriptions)
            .await
    }

    async fn get_income(&self, user_id: &str) -> RemoteResult<Option<Money>> {
        let body: IncomeBody = self.get_record(user_id, "income").await?;
        Ok(Some(body.income))
    }

    async fn set_income(&self, user_id: &str, income: Money) -> RemoteResult<()> {
        self.put_record(user_id, "income", &IncomeBody { income })
            .await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
