//! # Synced Repository
//!
//! The data-access surface the application talks to. Every load and save
//! succeeds against whichever of {remote store, local cache} is reachable.
//!
//! ## Read and Write Paths
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SyncedRepository                                 │
//! │                                                                         │
//! │  LOAD (remote-first)                                                    │
//! │    Online?  ──► remote.get ── Ok(Some) ──► cache.put(clean) ──► data  │
//! │       │                  └─── Ok(None) ──► default (empty / zero)      │
//! │       │                  └─── Err ──► state → Offline, fall through   │
//! │       └─ Offline ──► cache.get ── Some ──► decode (corrupt = absent)  │
//! │                                └── None ──► default                     │
//! │                                                                         │
//! │  SAVE (cache-as-backup)                                                 │
//! │    Online?  ──► remote.set ── Ok  ──► cache.put(clean)     offline: F │
//! │       │                  └─── Err ──► state → Offline ─┐              │
//! │       └─ Offline ──────────────────────────────────────┤              │
//! │                        cache.put(pending) + queue.enqueue  offline: T │
//! │                                                                         │
//! │  DRAIN (sync_pending, oldest first)                                     │
//! │    per entry: decode ── fail ──► drop poison entry                     │
//! │              replay  ── Ok   ──► queue.remove                           │
//! │                      └─ Err  ──► mark_failed + BLOCK that kind         │
//! │    a blocked kind's later entries stay queued (order preserved);       │
//! │    the other kind keeps draining                                       │
//! │    afterwards: cache.mark_clean for fully-drained (kind, user) pairs   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## What "offline" Means to Callers
//! A `Synced { offline: true }` result is a success with a caveat: the value
//! was served from (or durably written to) local storage only. Callers
//! surface it as a notice, never as a failure.

use std::collections::HashSet;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use subtrack_core::{Money, PendingWrite, RecordKind, Subscription};
use subtrack_store::Database;

use crate::connectivity::Connectivity;
use crate::error::SyncResult;
use crate::remote::RemoteStore;

// =============================================================================
// Result Wrappers
// =============================================================================

/// A value together with the channel that produced (or absorbed) it.
#[derive(Debug, Clone, PartialEq)]
pub struct Synced<T> {
    /// The loaded or saved value.
    pub data: T,

    /// True when the remote store was not involved: the value came from the
    /// local cache, or the write was queued for replay.
    pub offline: bool,
}

impl<T> Synced<T> {
    fn online(data: T) -> Self {
        Synced { data, offline: false }
    }

    fn offline(data: T) -> Self {
        Synced { data, offline: true }
    }
}

/// Outcome of one [`SyncedRepository::sync_pending`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Entries that reached the remote store and were consumed.
    pub replayed: usize,

    /// Entries whose replay failed; they (and later entries of the same
    /// kind) remain queued.
    pub failed: usize,
}

// =============================================================================
// Synced Repository
// =============================================================================

/// Offline-tolerant repository over a [`RemoteStore`] and the local database.
///
/// Clone-cheap via the shared remote and pooled database; one instance is
/// shared between request handlers and the replay worker.
#[derive(Debug)]
pub struct SyncedRepository<R: RemoteStore> {
    remote: Arc<R>,
    db: Database,
    connectivity: Connectivity,
}

impl<R: RemoteStore> SyncedRepository<R> {
    /// Creates a new SyncedRepository.
    pub fn new(remote: Arc<R>, db: Database, connectivity: Connectivity) -> Self {
        SyncedRepository {
            remote,
            db,
            connectivity,
        }
    }

    /// The shared connectivity handle (for wiring platform signals and the
    /// replay worker).
    pub fn connectivity(&self) -> &Connectivity {
        &self.connectivity
    }

    /// The remote store this repository fronts.
    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Number of writes still awaiting replay.
    pub async fn pending_count(&self) -> SyncResult<i64> {
        Ok(self.db.pending_writes().count().await?)
    }

    // =========================================================================
    // Loads
    // =========================================================================

    /// Loads a user's subscription list; absent data is an empty list.
    pub async fn load_subscriptions(&self, user_id: &str) -> SyncResult<Synced<Vec<Subscription>>> {
        if user_id.is_empty() {
            debug!("Load with empty user id, returning default");
            return Ok(Synced::offline(Vec::new()));
        }

        if self.connectivity.is_online() {
            match self.remote.get_subscriptions(user_id).await {
                Ok(found) => {
                    let data = found.unwrap_or_default();
                    self.refresh_cache(RecordKind::Subscriptions, user_id, &data)
                        .await?;
                    self.connectivity.set_online();
                    return Ok(Synced::online(data));
                }
                Err(err) => {
                    warn!(user_id = %user_id, error = %err, "Remote load failed, using cache");
                    self.connectivity.set_offline();
                }
            }
        }

        let data = self
            .load_cached::<Vec<Subscription>>(RecordKind::Subscriptions, user_id)
            .await?
            .unwrap_or_default();
        Ok(Synced::offline(data))
    }

    /// Loads a user's monthly income; absent data is zero.
    pub async fn load_income(&self, user_id: &str) -> SyncResult<Synced<Money>> {
        if user_id.is_empty() {
            debug!("Load with empty user id, returning default");
            return Ok(Synced::offline(Money::zero()));
        }

        if self.connectivity.is_online() {
            match self.remote.get_income(user_id).await {
                Ok(found) => {
                    let data = found.unwrap_or_else(Money::zero);
                    self.refresh_cache(RecordKind::Income, user_id, &data).await?;
                    self.connectivity.set_online();
                    return Ok(Synced::online(data));
                }
                Err(err) => {
                    warn!(user_id = %user_id, error = %err, "Remote load failed, using cache");
                    self.connectivity.set_offline();
                }
            }
        }

        let data = self
            .load_cached::<Money>(RecordKind::Income, user_id)
            .await?
            .unwrap_or_else(Money::zero);
        Ok(Synced::offline(data))
    }

    // =========================================================================
    // Saves
    // =========================================================================

    /// Wholesale-replaces a user's subscription list.
    pub async fn save_subscriptions(
        &self,
        user_id: &str,
        subscriptions: &[Subscription],
    ) -> SyncResult<Synced<()>> {
        if user_id.is_empty() {
            debug!("Save with empty user id, ignoring");
            return Ok(Synced::online(()));
        }

        let payload = serde_json::to_string(subscriptions)?;

        if self.connectivity.is_online() {
            match self.remote.set_subscriptions(user_id, subscriptions).await {
                Ok(()) => {
                    self.db
                        .cache()
                        .put(RecordKind::Subscriptions, user_id, &payload, false)
                        .await?;
                    self.connectivity.set_online();
                    return Ok(Synced::online(()));
                }
                Err(err) => {
                    warn!(user_id = %user_id, error = %err, "Remote save failed, queueing");
                    self.connectivity.set_offline();
                }
            }
        }

        self.store_offline(RecordKind::Subscriptions, user_id, payload)
            .await?;
        Ok(Synced::offline(()))
    }

    /// Wholesale-replaces a user's monthly income.
    pub async fn save_income(&self, user_id: &str, income: Money) -> SyncResult<Synced<()>> {
        if user_id.is_empty() {
            debug!("Save with empty user id, ignoring");
            return Ok(Synced::online(()));
        }

        let payload = serde_json::to_string(&income)?;

        if self.connectivity.is_online() {
            match self.remote.set_income(user_id, income).await {
                Ok(()) => {
                    self.db
                        .cache()
                        .put(RecordKind::Income, user_id, &payload, false)
                        .await?;
                    self.connectivity.set_online();
                    return Ok(Synced::online(()));
                }
                Err(err) => {
                    warn!(user_id = %user_id, error = %err, "Remote save failed, queueing");
                    self.connectivity.set_offline();
                }
            }
        }

        self.store_offline(RecordKind::Income, user_id, payload).await?;
        Ok(Synced::offline(()))
    }

    // =========================================================================
    // Replay
    // =========================================================================

    /// Drains the pending-write queue against the remote store.
    ///
    /// Entries replay strictly oldest-first. A transport failure blocks the
    /// failing entry's KIND for the rest of the pass (replaying a later
    /// write of the same kind first would reorder last-write-wins); the
    /// other kind keeps draining. An entry whose payload no longer decodes
    /// is dropped - it can never replay, and leaving it would wedge its
    /// kind forever.
    pub async fn sync_pending(&self) -> SyncResult<DrainReport> {
        let queue = self.db.pending_writes();
        let writes = queue.oldest_first().await?;
        if writes.is_empty() {
            return Ok(DrainReport::default());
        }

        info!(queued = writes.len(), "Replaying pending writes");

        let mut report = DrainReport::default();
        let mut blocked_kinds: HashSet<RecordKind> = HashSet::new();
        let mut replayed_pairs: HashSet<(RecordKind, String)> = HashSet::new();
        let mut dirty_pairs: HashSet<(RecordKind, String)> = HashSet::new();

        for write in writes {
            let pair = (write.kind, write.user_id.clone());

            if blocked_kinds.contains(&write.kind) {
                dirty_pairs.insert(pair);
                continue;
            }

            match self.replay_one(&write).await {
                Ok(true) => {
                    queue.remove(&write.id).await?;
                    replayed_pairs.insert(pair);
                    report.replayed += 1;
                }
                Ok(false) => {
                    // Poison entry: undecodable payload, dropped above
                    queue.remove(&write.id).await?;
                }
                Err(err) => {
                    warn!(
                        id = %write.id,
                        kind = %write.kind,
                        attempts = write.attempts + 1,
                        error = %err,
                        "Replay failed, keeping entry queued"
                    );
                    queue.mark_failed(&write.id, &err).await?;
                    blocked_kinds.insert(write.kind);
                    dirty_pairs.insert(pair);
                    report.failed += 1;
                }
            }
        }

        // A pair is clean only once everything queued for it has replayed
        for (kind, user_id) in replayed_pairs.difference(&dirty_pairs) {
            self.db.cache().mark_clean(*kind, user_id).await?;
        }

        if report.failed > 0 {
            self.connectivity.set_offline();
        } else if report.replayed > 0 {
            self.connectivity.set_online();
        }

        info!(
            replayed = report.replayed,
            failed = report.failed,
            "Replay pass complete"
        );
        Ok(report)
    }

    /// Replays a single queue entry.
    ///
    /// `Ok(true)` = applied, `Ok(false)` = poison payload, `Err` = transport.
    async fn replay_one(&self, write: &PendingWrite) -> Result<bool, String> {
        match write.kind {
            RecordKind::Subscriptions => {
                let subscriptions: Vec<Subscription> = match serde_json::from_str(&write.payload) {
                    Ok(v) => v,
                    Err(err) => {
                        warn!(id = %write.id, error = %err, "Dropping undecodable pending write");
                        return Ok(false);
                    }
                };
                self.remote
                    .set_subscriptions(&write.user_id, &subscriptions)
                    .await
                    .map_err(|e| e.to_string())?;
            }
            RecordKind::Income => {
                let income: Money = match serde_json::from_str(&write.payload) {
                    Ok(v) => v,
                    Err(err) => {
                        warn!(id = %write.id, error = %err, "Dropping undecodable pending write");
                        return Ok(false);
                    }
                };
                self.remote
                    .set_income(&write.user_id, income)
                    .await
                    .map_err(|e| e.to_string())?;
            }
        }
        Ok(true)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Mirrors a remotely-loaded value into the cache (clean).
    async fn refresh_cache<T: Serialize>(
        &self,
        kind: RecordKind,
        user_id: &str,
        data: &T,
    ) -> SyncResult<()> {
        let payload = serde_json::to_string(data)?;
        self.db.cache().put(kind, user_id, &payload, false).await?;
        Ok(())
    }

    /// Reads and decodes the cached value; a corrupt payload is absent data.
    async fn load_cached<T: DeserializeOwned>(
        &self,
        kind: RecordKind,
        user_id: &str,
    ) -> SyncResult<Option<T>> {
        let Some(record) = self.db.cache().get(kind, user_id).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&record.payload) {
            Ok(data) => Ok(Some(data)),
            Err(err) => {
                warn!(
                    kind = %kind,
                    user_id = %user_id,
                    error = %err,
                    "Corrupt cached payload, treating as absent"
                );
                Ok(None)
            }
        }
    }

    /// Caches a write locally (pending) and queues it for replay.
    async fn store_offline(
        &self,
        kind: RecordKind,
        user_id: &str,
        payload: String,
    ) -> SyncResult<()> {
        self.db.cache().put(kind, user_id, &payload, true).await?;
        self.db
            .pending_writes()
            .enqueue(&PendingWrite::new(kind, user_id, payload))
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
    use crate::remote::MemoryRemoteStore;
    use subtrack_core::{Frequency, Priority};
    use subtrack_store::DbConfig;

    async fn repo(connectivity: Connectivity) -> SyncedRepository<MemoryRemoteStore> {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        SyncedRepository::new(Arc::new(MemoryRemoteStore::new()), db, connectivity)
    }

    fn sub(name: &str, id: i64, cents: i64) -> Subscription {
        let mut s = Subscription::new(
            name,
            Money::from_cents(cents),
            Frequency::Monthly,
            Priority::Medium,
        );
        s.id = id;
        s
    }

    #[tokio::test]
    async fn test_online_save_and_load_round_trip() {
        let repo = repo(Connectivity::online()).await;
        let subs = vec![sub("Netflix", 1, 1500)];

        let saved = repo.save_subscriptions("user-1", &subs).await.unwrap();
        assert!(!saved.offline);

        let loaded = repo.load_subscriptions("user-1").await.unwrap();
        assert!(!loaded.offline);
        assert_eq!(loaded.data, subs);
        assert_eq!(repo.pending_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_offline_round_trip_never_touches_remote() {
        let repo = repo(Connectivity::offline()).await;
        let subs = vec![sub("Netflix", 1, 1500), sub("Gym", 2, 3000)];

        let saved = repo.save_subscriptions("user-1", &subs).await.unwrap();
        assert!(saved.offline);

        let loaded = repo.load_subscriptions("user-1").await.unwrap();
        assert!(loaded.offline);
        assert_eq!(loaded.data, subs);

        // Nothing reached the remote; the write is queued instead
        assert!(repo.remote.write_log().is_empty());
        assert_eq!(repo.pending_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_absent_income_defaults_to_zero() {
        let online = repo(Connectivity::online()).await;
        assert!(online.load_income("new-user").await.unwrap().data.is_zero());

        let offline = repo(Connectivity::offline()).await;
        assert!(offline.load_income("new-user").await.unwrap().data.is_zero());
    }

    #[tokio::test]
    async fn test_remote_failure_degrades_to_cache_and_flips_state() {
        let repo = repo(Connectivity::online()).await;
        repo.save_income("user-1", Money::from_cents(250_000))
            .await
            .unwrap();

        repo.remote.set_reachable(false);
        let loaded = repo.load_income("user-1").await.unwrap();

        // Served from cache, and the failed call was the offline signal
        assert!(loaded.offline);
        assert_eq!(loaded.data.cents(), 250_000);
        assert!(!repo.connectivity().is_online());
    }

    #[tokio::test]
    async fn test_offline_edit_replays_on_reconnect() {
        let repo = repo(Connectivity::online()).await;
        repo.save_income("user-1", Money::from_cents(250_000))
            .await
            .unwrap();

        repo.remote.set_reachable(false);
        let saved = repo.save_income("user-1", Money::from_cents(300_000)).await.unwrap();
        assert!(saved.offline);
        assert_eq!(repo.pending_count().await.unwrap(), 1);

        repo.remote.set_reachable(true);
        let report = repo.sync_pending().await.unwrap();
        assert_eq!(report, DrainReport { replayed: 1, failed: 0 });

        assert_eq!(repo.remote.income_of("user-1").unwrap().cents(), 300_000);
        assert_eq!(repo.pending_count().await.unwrap(), 0);
        assert!(repo.connectivity().is_online());

        // The cache row is clean again
        let cached = repo
            .db
            .cache()
            .get(RecordKind::Income, "user-1")
            .await
            .unwrap()
            .unwrap();
        assert!(!cached.pending);
    }

    #[tokio::test]
    async fn test_replay_preserves_order_last_write_wins() {
        let repo = repo(Connectivity::offline()).await;
        let with_gym = vec![sub("Netflix", 1, 1500), sub("Gym", 2, 3000)];
        let without_gym = vec![sub("Netflix", 1, 1500)];

        repo.save_subscriptions("user-1", &with_gym).await.unwrap();
        repo.save_subscriptions("user-1", &without_gym).await.unwrap();
        assert_eq!(repo.pending_count().await.unwrap(), 2);

        let report = repo.sync_pending().await.unwrap();
        assert_eq!(report.replayed, 2);

        // Both writes applied, in order; the store ends without Gym
        let log = repo.remote.write_log();
        assert_eq!(log.len(), 2);
        assert_eq!(
            repo.remote.subscriptions_of("user-1").unwrap(),
            without_gym
        );
    }

    #[tokio::test]
    async fn test_drain_is_idempotent() {
        let repo = repo(Connectivity::offline()).await;
        repo.save_income("user-1", Money::from_cents(100)).await.unwrap();

        assert_eq!(repo.sync_pending().await.unwrap().replayed, 1);

        // Second pass finds nothing: the entry was consumed exactly once
        assert_eq!(repo.sync_pending().await.unwrap(), DrainReport::default());
        assert_eq!(repo.remote.write_log().len(), 1);
    }

    #[tokio::test]
    async fn test_failure_blocks_only_its_own_kind() {
        let repo = repo(Connectivity::offline()).await;
        repo.save_income("user-1", Money::from_cents(1)).await.unwrap();
        repo.save_subscriptions("user-1", &[sub("A", 1, 100)]).await.unwrap();
        repo.save_income("user-1", Money::from_cents(2)).await.unwrap();

        repo.remote.set_failing_kind(Some(RecordKind::Income));
        let report = repo.sync_pending().await.unwrap();

        // First income write fails and blocks the second; subscriptions drain
        assert_eq!(report, DrainReport { replayed: 1, failed: 1 });
        assert_eq!(repo.pending_count().await.unwrap(), 2);
        assert!(repo.remote.income_of("user-1").is_none());
        assert!(repo.remote.subscriptions_of("user-1").is_some());
        assert!(!repo.connectivity().is_online());

        // Outage over: the blocked entries drain in their original order
        repo.remote.set_failing_kind(None);
        let report = repo.sync_pending().await.unwrap();
        assert_eq!(report, DrainReport { replayed: 2, failed: 0 });
        assert_eq!(repo.remote.income_of("user-1").unwrap().cents(), 2);
        assert!(repo.connectivity().is_online());
    }

    #[tokio::test]
    async fn test_failed_replay_keeps_cache_pending() {
        let repo = repo(Connectivity::offline()).await;
        repo.save_income("user-1", Money::from_cents(100)).await.unwrap();

        repo.remote.set_reachable(false);
        repo.sync_pending().await.unwrap();

        let cached = repo
            .db
            .cache()
            .get(RecordKind::Income, "user-1")
            .await
            .unwrap()
            .unwrap();
        assert!(cached.pending);
        assert_eq!(repo.pending_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_poison_queue_entry_is_dropped() {
        let repo = repo(Connectivity::offline()).await;
        repo.db
            .pending_writes()
            .enqueue(&PendingWrite::new(
                RecordKind::Subscriptions,
                "user-1",
                "not json",
            ))
            .await
            .unwrap();
        repo.save_income("user-1", Money::from_cents(5)).await.unwrap();

        let report = repo.sync_pending().await.unwrap();

        // The poison entry is neither replayed nor failed; it is gone, and
        // it did not block the income write behind it
        assert_eq!(report, DrainReport { replayed: 1, failed: 0 });
        assert_eq!(repo.pending_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_corrupt_cache_payload_is_absent_data() {
        let repo = repo(Connectivity::offline()).await;
        repo.db
            .cache()
            .put(RecordKind::Subscriptions, "user-1", "{{garbage", true)
            .await
            .unwrap();

        let loaded = repo.load_subscriptions("user-1").await.unwrap();
        assert!(loaded.data.is_empty());
    }

    #[tokio::test]
    async fn test_empty_user_id_is_a_no_op() {
        let repo = repo(Connectivity::online()).await;

        repo.save_income("", Money::from_cents(100)).await.unwrap();
        let loaded = repo.load_subscriptions("").await.unwrap();

        assert!(loaded.data.is_empty());
        assert!(repo.remote.write_log().is_empty());
        assert_eq!(repo.pending_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_budget_math_is_storage_path_independent() {
        let subs = vec![
            {
                let mut s = sub("Weekly", 1, 1000);
                s.frequency = Frequency::Weekly;
                s
            },
            {
                let mut s = sub("Monthly", 2, 2000);
                s.frequency = Frequency::Monthly;
                s
            },
            {
                let mut s = sub("Yearly", 3, 12_000);
                s.frequency = Frequency::Yearly;
                s
            },
            {
                let mut s = sub("OneTime", 4, 5000);
                s.frequency = Frequency::OneTime;
                s
            },
        ];

        let total = |list: &[Subscription]| -> i64 {
            list.iter().map(|s| s.monthly_cost().cents()).sum()
        };

        // Served from the remote
        let online = repo(Connectivity::online()).await;
        online.save_subscriptions("user-1", &subs).await.unwrap();
        let loaded = online.load_subscriptions("user-1").await.unwrap();
        assert_eq!(total(&loaded.data), 7330);

        // Served from the cache
        let offline = repo(Connectivity::offline()).await;
        offline.save_subscriptions("user-1", &subs).await.unwrap();
        let loaded = offline.load_subscriptions("user-1").await.unwrap();
        assert_eq!(total(&loaded.data), 7330);
    }

    #[tokio::test]
    async fn test_online_load_refreshes_cache() {
        let repo = repo(Connectivity::online()).await;
        repo.remote
            .set_income("user-1", Money::from_cents(400_000))
            .await
            .unwrap();

        repo.load_income("user-1").await.unwrap();

        // Later, offline, the refreshed cache serves the remote value
        repo.connectivity().set_offline();
        let loaded = repo.load_income("user-1").await.unwrap();
        assert!(loaded.offline);
        assert_eq!(loaded.data.cents(), 400_000);
    }
}
