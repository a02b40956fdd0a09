//! # Remote Store Boundary
//!
//! The trait the sync layer consumes, plus an in-memory implementation.
//!
//! ## The Boundary Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     RemoteStore Boundary                                │
//! │                                                                         │
//! │  Exactly four operations, two per record kind:                         │
//! │                                                                         │
//! │     get_subscriptions(user) ──► Ok(Some(list)) │ Ok(None) │ Err       │
//! │     set_subscriptions(user, list)                                      │
//! │     get_income(user)        ──► Ok(Some(cents)) │ Ok(None) │ Err      │
//! │     set_income(user, cents)                                            │
//! │                                                                         │
//! │  Ok(None) = the user has no such document yet. A VALID result,        │
//! │             distinct from failure. The sync layer defaults it to       │
//! │             empty-list / zero.                                          │
//! │                                                                         │
//! │  Err      = "unreachable", full stop. The sync layer deliberately      │
//! │             does NOT interpret an error taxonomy at this boundary -    │
//! │             any rejection degrades to the cache the same way.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

use subtrack_core::{Money, RecordKind, Subscription};

// =============================================================================
// Error
// =============================================================================

/// The single failure mode at this boundary.
///
/// Implementations fold every transport-level problem (DNS, refused
/// connection, 5xx, timeout, malformed body) into this one error; the
/// message exists for logs only.
#[derive(Debug, Error)]
#[error("Remote store unreachable: {0}")]
pub struct RemoteUnreachable(pub String);

/// Result type for remote store operations.
pub type RemoteResult<T> = Result<T, RemoteUnreachable>;

// =============================================================================
// Trait
// =============================================================================

/// The key-value document interface the sync layer consumes.
///
/// The remote store is the system of record, shared across devices and
/// sessions for a given user id.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetches a user's subscription list; `None` when never written.
    async fn get_subscriptions(&self, user_id: &str) -> RemoteResult<Option<Vec<Subscription>>>;

    /// Wholesale-replaces a user's subscription list.
    async fn set_subscriptions(
        &self,
        user_id: &str,
        subscriptions: &[Subscription],
    ) -> RemoteResult<()>;

    /// Fetches a user's monthly income; `None` when never written.
    async fn get_income(&self, user_id: &str) -> RemoteResult<Option<Money>>;

    /// Wholesale-replaces a user's monthly income.
    async fn set_income(&self, user_id: &str, income: Money) -> RemoteResult<()>;
}

// =============================================================================
// In-Memory Implementation
// =============================================================================

/// In-memory [`RemoteStore`].
///
/// Serves two purposes:
/// - an isolated deployment with no cloud account configured
/// - tests, via [`set_reachable`] (fault injection) and [`write_log`]
///   (write-order assertions)
///
/// [`set_reachable`]: MemoryRemoteStore::set_reachable
/// [`write_log`]: MemoryRemoteStore::write_log
#[derive(Debug, Default)]
pub struct MemoryRemoteStore {
    inner: Mutex<Inner>,
}

#[derive(Debug)]
struct Inner {
    subscriptions: HashMap<String, Vec<Subscription>>,
    income: HashMap<String, Money>,
    reachable: bool,
    /// When set, operations on this kind fail while other kinds succeed.
    failing_kind: Option<RecordKind>,
    /// Every applied write, in arrival order: (kind, user_id, payload JSON).
    write_log: Vec<(RecordKind, String, String)>,
}

impl Default for Inner {
    fn default() -> Self {
        Inner {
            subscriptions: HashMap::new(),
            income: HashMap::new(),
            reachable: true,
            failing_kind: None,
            write_log: Vec::new(),
        }
    }
}

impl MemoryRemoteStore {
    /// Creates a reachable, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggles reachability; while unreachable every operation fails.
    pub fn set_reachable(&self, reachable: bool) {
        self.inner.lock().unwrap().reachable = reachable;
    }

    /// Makes operations on one kind fail while the other keeps working,
    /// simulating a partial outage (e.g. one document collection rejecting
    /// writes).
    pub fn set_failing_kind(&self, kind: Option<RecordKind>) {
        self.inner.lock().unwrap().failing_kind = kind;
    }

    /// Snapshot of all applied writes, in arrival order.
    pub fn write_log(&self) -> Vec<(RecordKind, String, String)> {
        self.inner.lock().unwrap().write_log.clone()
    }

    /// Direct read of the stored subscription list (test inspection).
    pub fn subscriptions_of(&self, user_id: &str) -> Option<Vec<Subscription>> {
        self.inner.lock().unwrap().subscriptions.get(user_id).cloned()
    }

    /// Direct read of the stored income (test inspection).
    pub fn income_of(&self, user_id: &str) -> Option<Money> {
        self.inner.lock().unwrap().income.get(user_id).copied()
    }

    fn check_reachable(inner: &Inner, kind: RecordKind) -> RemoteResult<()> {
        if !inner.reachable {
            return Err(RemoteUnreachable("simulated network failure".to_string()));
        }
        if inner.failing_kind == Some(kind) {
            return Err(RemoteUnreachable(format!(
                "simulated outage for {kind} operations"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    async fn get_subscriptions(&self, user_id: &str) -> RemoteResult<Option<Vec<Subscription>>> {
        let inner = self.inner.lock().unwrap();
        Self::check_reachable(&inner, RecordKind::Subscriptions)?;
        Ok(inner.subscriptions.get(user_id).cloned())
    }

    async fn set_subscriptions(
        &self,
        user_id: &str,
        subscriptions: &[Subscription],
    ) -> RemoteResult<()> {
        let mut inner = self.inner.lock().unwrap();
        Self::check_reachable(&inner, RecordKind::Subscriptions)?;

        let payload = serde_json::to_string(subscriptions)
            .map_err(|e| RemoteUnreachable(e.to_string()))?;
        inner
            .subscriptions
            .insert(user_id.to_string(), subscriptions.to_vec());
        inner
            .write_log
            .push((RecordKind::Subscriptions, user_id.to_string(), payload));
        Ok(())
    }

    async fn get_income(&self, user_id: &str) -> RemoteResult<Option<Money>> {
        let inner = self.inner.lock().unwrap();
        Self::check_reachable(&inner, RecordKind::Income)?;
        Ok(inner.income.get(user_id).copied())
    }

    async fn set_income(&self, user_id: &str, income: Money) -> RemoteResult<()> {
        let mut inner = self.inner.lock().unwrap();
        Self::check_reachable(&inner, RecordKind::Income)?;

        inner.income.insert(user_id.to_string(), income);
        inner.write_log.push((
            RecordKind::Income,
            user_id.to_string(),
            income.cents().to_string(),
        ));
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
