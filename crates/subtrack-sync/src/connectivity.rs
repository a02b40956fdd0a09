//! # Connectivity Tracking
//!
//! The Online ⇄ Offline state machine shared by the repository and the
//! replay worker.
//!
//! ## Dual Detection
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Connectivity State Machine                            │
//! │                                                                         │
//! │           external "online" signal ──────────┐                         │
//! │           successful remote call ────────────┤                         │
//! │                                              ▼                         │
//! │                 ┌──────────┐           ┌──────────┐                    │
//! │                 │ Offline  │ ────────► │  Online  │                    │
//! │                 │          │ ◄──────── │          │                    │
//! │                 └──────────┘           └──────────┘                    │
//! │                                              │                         │
//! │           external "offline" signal ─────────┤                         │
//! │           failed remote call ────────────────┘                         │
//! │                                                                         │
//! │  A remote call that fails flips the state to Offline even if the      │
//! │  platform's network signal hasn't fired yet - the call outcome is     │
//! │  ground truth, the signal is advisory.                                 │
//! │                                                                         │
//! │  Every Offline→Online transition is observable through the watch      │
//! │  channel; the ReplayWorker drains the pending queue on each one.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tokio::sync::watch;
use tracing::info;

// =============================================================================
// Connection State
// =============================================================================

/// Whether the remote store is believed reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Remote calls are attempted.
    Online,
    /// Remote calls are skipped; writes go straight to the queue.
    Offline,
}

// =============================================================================
// Connectivity Handle
// =============================================================================

/// Shared connectivity handle.
///
/// Cloneable; all clones observe and drive the same state. The embedding
/// application wires its platform network events to [`set_online`] /
/// [`set_offline`]; the repository reports call outcomes through the same
/// two methods.
///
/// [`set_online`]: Connectivity::set_online
/// [`set_offline`]: Connectivity::set_offline
#[derive(Debug, Clone)]
pub struct Connectivity {
    tx: std::sync::Arc<watch::Sender<ConnectionState>>,
}

impl Connectivity {
    /// Creates a handle in the given initial state.
    pub fn new(initial: ConnectionState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Connectivity {
            tx: std::sync::Arc::new(tx),
        }
    }

    /// Creates a handle that starts Online (the common case at startup).
    pub fn online() -> Self {
        Connectivity::new(ConnectionState::Online)
    }

    /// Creates a handle that starts Offline.
    pub fn offline() -> Self {
        Connectivity::new(ConnectionState::Offline)
    }

    /// Current state.
    pub fn state(&self) -> ConnectionState {
        *self.tx.borrow()
    }

    /// True when remote calls should be attempted.
    pub fn is_online(&self) -> bool {
        self.state() == ConnectionState::Online
    }

    /// Marks the remote store reachable.
    ///
    /// Only an actual Offline→Online transition notifies subscribers, so
    /// repeated confirmations from successful calls don't re-trigger drains.
    pub fn set_online(&self) {
        let transitioned = self.tx.send_if_modified(|state| {
            if *state == ConnectionState::Online {
                return false;
            }
            *state = ConnectionState::Online;
            true
        });

        if transitioned {
            info!("Connectivity restored");
        }
    }

    /// Marks the remote store unreachable.
    pub fn set_offline(&self) {
        let transitioned = self.tx.send_if_modified(|state| {
            if *state == ConnectionState::Offline {
                return false;
            }
            *state = ConnectionState::Offline;
            true
        });

        if transitioned {
            info!("Connectivity lost, switching to offline mode");
        }
    }

    /// Subscribes to state transitions.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.tx.subscribe()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_initial_states() {
        assert!(Connectivity::online().is_online());
        assert!(!Connectivity::offline().is_online());
    }

    #[tokio::test]
    async fn test_transitions_notify_subscribers() {
        let conn = Connectivity::online();
        let mut rx = conn.subscribe();

        conn.set_offline();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), ConnectionState::Offline);

        conn.set_online();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), ConnectionState::Online);
    }

    #[tokio::test]
    async fn test_redundant_sets_do_not_notify() {
        let conn = Connectivity::online();
        let mut rx = conn.subscribe();
        rx.borrow_and_update();

        conn.set_online();
        conn.set_online();

        // No transition happened, so nothing to observe
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let conn = Connectivity::online();
        let clone = conn.clone();

        clone.set_offline();
        assert!(!conn.is_online());
    }
}
