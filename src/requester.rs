//! Per-requester context.
//!
//! A [`Requester`] is what [`crate::coordinator::LoadCoordinator::activate`]
//! hands back. It holds two independent timer slots, one for waiting on a
//! load someone else issued and one for waiting on its own load, and the
//! requester's observable [`LoadState`].
//!
//! Tearing a requester down (or dropping it) cancels its own timers and
//! nothing else: the shared load keeps going for everyone else.

use std::fmt;

use crate::notifier::{LoadState, ReadyNotifier, ReadySignal};
use crate::poll::TimerHandle;

/// Identifies a requester in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequesterId(pub u64);

impl fmt::Display for RequesterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One activated requester.
#[derive(Debug)]
pub struct Requester {
    id: RequesterId,
    notifier: ReadyNotifier,
    follow_timer: Option<TimerHandle>,
    load_timer: Option<TimerHandle>,
}

impl Requester {
    /// A requester with nothing to wait for.
    pub(crate) fn idle(id: RequesterId, notifier: ReadyNotifier) -> Self {
        Self {
            id,
            notifier,
            follow_timer: None,
            load_timer: None,
        }
    }

    pub(crate) fn leader(id: RequesterId, notifier: ReadyNotifier, timer: TimerHandle) -> Self {
        Self {
            id,
            notifier,
            follow_timer: None,
            load_timer: Some(timer),
        }
    }

    pub(crate) fn follower(id: RequesterId, notifier: ReadyNotifier, timer: TimerHandle) -> Self {
        Self {
            id,
            notifier,
            follow_timer: Some(timer),
            load_timer: None,
        }
    }

    /// This requester's id.
    pub fn id(&self) -> RequesterId {
        self.id
    }

    /// Current state.
    pub fn state(&self) -> LoadState {
        self.notifier.state()
    }

    /// Whether the dependency has been observed ready.
    pub fn is_ready(&self) -> bool {
        self.state().is_ready()
    }

    /// A read-only view of this requester's state for another task.
    pub fn signal(&self) -> ReadySignal {
        self.notifier.signal()
    }

    /// Wait until the dependency is observed ready.
    ///
    /// Never resolves for a requester that cannot load (a non-interactive
    /// host) or whose load stalls forever.
    pub async fn ready(&self) {
        let mut signal = self.signal();
        // The requester holds its own notifier, so the channel stays open.
        signal.wait_ready().await;
    }

    /// Number of this requester's timers still waiting to fire.
    pub fn pending_timers(&self) -> usize {
        [&self.follow_timer, &self.load_timer]
            .into_iter()
            .flatten()
            .filter(|timer| timer.is_pending())
            .count()
    }

    /// Release the requester, cancelling its pending timers.
    pub fn teardown(self) {
        drop(self);
    }

    fn cancel_timers(&mut self) -> usize {
        let mut cancelled = 0;
        for timer in [self.follow_timer.take(), self.load_timer.take()]
            .into_iter()
            .flatten()
        {
            if timer.is_pending() {
                cancelled += 1;
            }
            timer.cancel();
        }
        cancelled
    }
}

impl Drop for Requester {
    fn drop(&mut self) {
        let cancelled = self.cancel_timers();
        if cancelled > 0 {
            tracing::debug!(
                "Requester {} torn down, cancelled {} pending timer(s)",
                self.id,
                cancelled
            );
        }
    }
}
