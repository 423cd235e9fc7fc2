//! Poll cycles.
//!
//! A [`PollCycle`] is one requester's check-then-wait loop: sleep the
//! fixed interval, ask the probe, and either reschedule or move the
//! requester to Ready and stop. There is no upper bound on the number of
//! checks. The cycle ends on readiness or when its [`TimerHandle`] is
//! cancelled.
//!
//! The completion hook wakes every live cycle early so it re-checks
//! immediately instead of waiting out the interval. The probe stays the
//! only source of truth: a wake-up without readiness just starts the
//! next interval.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{trace, warn};

use crate::coordinator::{GateSettings, GateShared};
use crate::notifier::{ReadyNotifier, Role};
use crate::probe::ReadinessProbe;
use crate::requester::RequesterId;

/// Handle to a scheduled poll cycle.
///
/// Dropping the handle cancels the cycle.
#[derive(Debug)]
pub struct TimerHandle {
    task: JoinHandle<()>,
}

impl TimerHandle {
    /// Whether the cycle is still waiting to fire.
    pub fn is_pending(&self) -> bool {
        !self.task.is_finished()
    }

    /// Cancel the cycle. It will not check the probe again.
    pub fn cancel(&self) {
        self.task.abort();
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// One requester's self-rescheduling readiness check.
pub(crate) struct PollCycle {
    requester: RequesterId,
    role: Role,
    probe: Arc<dyn ReadinessProbe>,
    gate: Arc<GateShared>,
    notifier: ReadyNotifier,
    interval: Duration,
    stall_warning: Option<Duration>,
}

impl PollCycle {
    pub(crate) fn new(
        requester: RequesterId,
        role: Role,
        probe: Arc<dyn ReadinessProbe>,
        gate: Arc<GateShared>,
        notifier: ReadyNotifier,
        settings: GateSettings,
    ) -> Self {
        Self {
            requester,
            role,
            probe,
            gate,
            notifier,
            interval: settings.poll_interval,
            stall_warning: settings.stall_warning,
        }
    }

    /// Schedule the first check one interval from now.
    ///
    /// The deadline is fixed here, not when the task first runs.
    pub(crate) fn schedule(self, runtime: &Handle) -> TimerHandle {
        let started = Instant::now();
        let first = started + self.interval;
        TimerHandle {
            task: runtime.spawn(self.run(started, first)),
        }
    }

    async fn run(self, started: Instant, mut deadline: Instant) {
        let mut warned = false;
        loop {
            let settled = self.gate.settled().notified();
            tokio::select! {
                _ = time::sleep_until(deadline) => {
                    trace!("Requester {} ({:?}) poll tick", self.requester, self.role);
                }
                _ = settled => {
                    trace!("Requester {} woken by completion hook", self.requester);
                }
            }

            if self.probe.is_ready() {
                if self.notifier.notify_ready() {
                    tracing::debug!("Requester {} observed dependency ready", self.requester);
                }
                return;
            }

            let now = Instant::now();
            if let Some(limit) = self.stall_warning {
                if !warned && now.duration_since(started) >= limit {
                    warned = true;
                    self.gate.record_stall();
                    warn!(
                        "Requester {} still waiting for dependency after {:?}",
                        self.requester,
                        now.duration_since(started)
                    );
                }
            }
            deadline = now + self.interval;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn settle(handle: &TimerHandle) {
        for _ in 0..10 {
            if !handle.is_pending() {
                break;
            }
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn cancelled_handle_is_not_pending() {
        let handle = TimerHandle {
            task: tokio::spawn(std::future::pending::<()>()),
        };
        assert!(handle.is_pending());

        handle.cancel();
        settle(&handle).await;
        assert!(!handle.is_pending());
    }

    #[tokio::test]
    async fn finished_task_is_not_pending() {
        let handle = TimerHandle {
            task: tokio::spawn(async {}),
        };
        settle(&handle).await;
        assert!(!handle.is_pending());
    }
}
