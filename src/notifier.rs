//! Requester state and the one-shot Ready transition.
//!
//! Each requester owns a [`ReadyNotifier`] that moves it to
//! [`LoadState::Ready`] at most once. Anything outside the coordinator (a
//! render layer, a CLI spinner) observes that state through a
//! [`ReadySignal`] and never sees timers or flags.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

/// How a loading requester is waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Issued the load and polls for its own load to finish.
    Leader,
    /// Polls for a load someone else issued.
    Follower,
}

/// Observable state of one requester.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    /// Not activated, or activated where nothing can be loaded.
    Unstarted,
    /// Waiting for the dependency.
    Loading(Role),
    /// The dependency was observed ready. Terminal.
    Ready,
}

impl LoadState {
    /// Whether this is the terminal Ready state.
    pub fn is_ready(&self) -> bool {
        matches!(self, LoadState::Ready)
    }

    /// Whether the requester is still waiting.
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading(_))
    }
}

/// Moves one requester to Ready, once.
#[derive(Debug, Clone)]
pub(crate) struct ReadyNotifier {
    tx: Arc<watch::Sender<LoadState>>,
    fired: Arc<AtomicU64>,
}

impl ReadyNotifier {
    /// Create a notifier starting in `initial`.
    ///
    /// `fired` counts Ready transitions across every requester of a gate.
    pub(crate) fn new(initial: LoadState, fired: Arc<AtomicU64>) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self {
            tx: Arc::new(tx),
            fired,
        }
    }

    pub(crate) fn state(&self) -> LoadState {
        *self.tx.borrow()
    }

    pub(crate) fn signal(&self) -> ReadySignal {
        ReadySignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Transition to Ready. Returns false if already Ready.
    pub(crate) fn notify_ready(&self) -> bool {
        let transitioned = self.tx.send_if_modified(|state| {
            if state.is_ready() {
                false
            } else {
                *state = LoadState::Ready;
                true
            }
        });
        if transitioned {
            self.fired.fetch_add(1, Ordering::Relaxed);
        }
        transitioned
    }
}

/// Read-only view of a requester's state.
#[derive(Debug, Clone)]
pub struct ReadySignal {
    rx: watch::Receiver<LoadState>,
}

impl ReadySignal {
    /// Current state.
    pub fn state(&self) -> LoadState {
        *self.rx.borrow()
    }

    /// Whether the requester has reached Ready.
    pub fn is_ready(&self) -> bool {
        self.state().is_ready()
    }

    /// Wait until the requester reaches Ready.
    ///
    /// Returns `false` if the requester was torn down first.
    pub async fn wait_ready(&mut self) -> bool {
        self.rx.wait_for(LoadState::is_ready).await.is_ok()
    }
}
