//! # Replay Worker
//!
//! Background task that drains the pending-write queue whenever
//! connectivity returns.
//!
//! ## Worker Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        ReplayWorker                                     │
//! │                                                                         │
//! │   ┌──────────────┐   Offline→Online   ┌───────────────────────────┐    │
//! │   │ Connectivity │ ─────────────────► │  repo.sync_pending()       │    │
//! │   │ watch channel│                    │  (oldest-first drain)      │    │
//! │   └──────────────┘                    └───────────────────────────┘    │
//! │          ▲                                        ▲                    │
//! │          │                                        │ also on a timer   │
//! │   platform signals,                        ┌──────┴──────┐            │
//! │   call outcomes                            │ retry tick  │            │
//! │                                            │ (configurable)           │
//! │                                            └─────────────┘            │
//! │                                                                         │
//! │  The timer covers the gap the signal can't: a drain that itself        │
//! │  failed flipped the state back to Offline, and no external event       │
//! │  may ever fire again. Every tick retries the queue regardless of       │
//! │  state; a successful pass flips the state back to Online.              │
//! │                                                                         │
//! │  SHUTDOWN: handle.shutdown() → loop exits after the current pass       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info};

use crate::connectivity::ConnectionState;
use crate::remote::RemoteStore;
use crate::repository::SyncedRepository;

// =============================================================================
// Constants
// =============================================================================

/// Default interval between retry ticks.
const DEFAULT_RETRY_INTERVAL_SECS: u64 = 30;

// =============================================================================
// Replay Worker
// =============================================================================

/// Drains the pending-write queue on reconnect and on a retry timer.
pub struct ReplayWorker<R: RemoteStore> {
    /// The repository whose queue this worker drains.
    repo: Arc<SyncedRepository<R>>,

    /// Connectivity transitions.
    connectivity_rx: watch::Receiver<ConnectionState>,

    /// Interval between retry ticks.
    retry_interval: Duration,

    /// Shutdown receiver.
    shutdown_rx: mpsc::Receiver<()>,
}

/// Handle for controlling the replay worker.
#[derive(Debug, Clone)]
pub struct ReplayWorkerHandle {
    /// Shutdown sender.
    shutdown_tx: mpsc::Sender<()>,
}

impl ReplayWorkerHandle {
    /// Triggers graceful shutdown.
    ///
    /// A no-op if the worker already stopped.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

impl<R: RemoteStore> ReplayWorker<R> {
    /// Creates a new worker and returns a handle, with the default retry
    /// interval.
    pub fn new(repo: Arc<SyncedRepository<R>>) -> (Self, ReplayWorkerHandle) {
        Self::with_retry_interval(repo, Duration::from_secs(DEFAULT_RETRY_INTERVAL_SECS))
    }

    /// Creates a new worker with an explicit retry interval.
    pub fn with_retry_interval(
        repo: Arc<SyncedRepository<R>>,
        retry_interval: Duration,
    ) -> (Self, ReplayWorkerHandle) {
        let connectivity_rx = repo.connectivity().subscribe();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let worker = ReplayWorker {
            repo,
            connectivity_rx,
            retry_interval,
            shutdown_rx,
        };

        (worker, ReplayWorkerHandle { shutdown_tx })
    }

    /// Runs the worker loop.
    ///
    /// This should be spawned as a background task.
    pub async fn run(mut self) {
        info!("Replay worker starting");

        // Catch writes queued before the worker came up
        if self.repo.connectivity().is_online() {
            self.drain().await;
        }

        let mut interval = tokio::time::interval(self.retry_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        interval.reset();

        loop {
            tokio::select! {
                // Connectivity transition
                changed = self.connectivity_rx.changed() => {
                    if changed.is_err() {
                        // All Connectivity handles dropped
                        break;
                    }
                    if *self.connectivity_rx.borrow_and_update() == ConnectionState::Online {
                        self.drain().await;
                    }
                }

                // Retry tick. Unconditional: after a failed drain the state
                // is Offline and no further signal may come, so the timer is
                // the only path back.
                _ = interval.tick() => {
                    self.drain().await;
                }

                // Shutdown
                _ = self.shutdown_rx.recv() => {
                    info!("Replay worker shutting down");
                    break;
                }
            }
        }

        info!("Replay worker stopped");
    }

    async fn drain(&self) {
        match self.repo.sync_pending().await {
            Ok(report) if report.replayed > 0 || report.failed > 0 => {
                debug!(
                    replayed = report.replayed,
                    failed = report.failed,
                    "Drain pass finished"
                );
            }
            Ok(_) => {}
            Err(e) => {
                error!(?e, "Drain pass failed against the local store");
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
