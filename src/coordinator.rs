//! The load gate.
//!
//! A [`LoadCoordinator`] guards one shared dependency. Every requester
//! calls [`LoadCoordinator::activate`] once, and the gate decides:
//!
//! 1. **Ready**: the probe already succeeds, nothing to do.
//! 2. **Follow**: a load was already issued, so poll the probe.
//! 3. **Lead**: nothing issued yet, so mark the load in flight, register
//!    the completion hook, issue the load and poll for it.
//!
//! The decision between 2 and 3 and the flag update happen under a single
//! lock acquisition, so two requesters activating in the same tick can
//! never both lead.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use loadgate::coordinator::{GateSettings, LoadCoordinator, LoadOptions};
//! use loadgate::hook::CompletionHook;
//! use loadgate::initiator::{Endpoint, FetchPlan, LoadInitiator, Loader};
//!
//! struct Noop;
//! impl Loader for Noop {
//!     fn begin(&self, _plan: FetchPlan, _hook: CompletionHook) {}
//! }
//!
//! let initiator = LoadInitiator::new(Endpoint::default(), Arc::new(Noop));
//! let gate = LoadCoordinator::new(Arc::new(|| true), initiator, GateSettings::default());
//!
//! // Already ready: no identifier needed, no runtime needed.
//! let requester = gate.activate(&LoadOptions::default()).unwrap();
//! assert!(requester.is_ready());
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tracing::{debug, info};

use crate::error::{GateError, Result};
use crate::hook::CompletionHook;
use crate::initiator::{FetchPlan, LoadInitiator};
use crate::notifier::{LoadState, ReadyNotifier, Role};
use crate::poll::PollCycle;
use crate::probe::ReadinessProbe;
use crate::requester::{Requester, RequesterId};

/// Default delay between readiness checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(300);

/// Timing knobs for a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateSettings {
    /// Fixed delay between readiness checks.
    pub poll_interval: Duration,
    /// Log a warning once per requester after waiting this long.
    ///
    /// Polling continues regardless; there is no timeout.
    pub stall_warning: Option<Duration>,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            stall_warning: None,
        }
    }
}

/// Per-activation inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Identifier (credential) used to fetch the dependency.
    pub identifier: Option<String>,
    /// Bootstrap address replacing the default fetch location.
    pub alternate_address: Option<String>,
}

impl LoadOptions {
    /// Options with an identifier and the default fetch location.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: Some(identifier.into()),
            alternate_address: None,
        }
    }

    /// Use `address` instead of the default fetch location.
    pub fn with_alternate(mut self, address: impl Into<String>) -> Self {
        self.alternate_address = Some(address.into());
        self
    }

    /// The identifier, treating an empty string as absent.
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref().filter(|id| !id.is_empty())
    }

    /// The alternate address, treating an empty string as absent.
    pub fn alternate_address(&self) -> Option<&str> {
        self.alternate_address
            .as_deref()
            .filter(|address| !address.is_empty())
    }
}

/// Where the shared load is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPhase {
    /// No load issued yet.
    Idle,
    /// Issued, completion hook not yet fired. This is the in-flight flag.
    InFlight,
    /// The completion hook fired.
    Settled,
}

/// Snapshot of a gate's shared state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GateStats {
    /// Phase of the shared load.
    pub phase: LoadPhase,
    /// Whether a completion hook is registered and unfired.
    pub hook_registered: bool,
    /// Number of loads issued. Never more than one.
    pub loads_issued: u64,
    /// Number of requesters moved to Ready by polling.
    pub ready_notifications: u64,
    /// Number of stall warnings logged, at most one per requester.
    pub stall_warnings: u64,
}

#[derive(Debug)]
struct GateState {
    phase: LoadPhase,
    hook_slot: Option<u64>,
    next_hook_id: u64,
    loads_issued: u64,
}

/// State shared between the gate, its hooks and its poll cycles.
#[derive(Debug)]
pub(crate) struct GateShared {
    state: Mutex<GateState>,
    settled: Notify,
    ready_notifications: Arc<AtomicU64>,
    stall_warnings: AtomicU64,
}

impl GateShared {
    fn new() -> Self {
        Self {
            state: Mutex::new(GateState {
                phase: LoadPhase::Idle,
                hook_slot: None,
                next_hook_id: 1,
                loads_issued: 0,
            }),
            settled: Notify::new(),
            ready_notifications: Arc::new(AtomicU64::new(0)),
            stall_warnings: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Broadcast that fires when the completion hook runs.
    pub(crate) fn settled(&self) -> &Notify {
        &self.settled
    }

    pub(crate) fn record_stall(&self) {
        self.stall_warnings.fetch_add(1, Ordering::Relaxed);
    }

    /// Run the completion hook registered under `hook_id`.
    pub(crate) fn settle(&self, hook_id: u64, callback_name: &str) {
        {
            let mut state = self.lock();
            if state.hook_slot != Some(hook_id) {
                debug!("Ignoring stale completion hook '{}'", callback_name);
                return;
            }
            state.hook_slot = None;
            state.phase = LoadPhase::Settled;
        }
        info!("Load completed via '{}'", callback_name);
        self.settled.notify_waiters();
    }
}

/// The decision made for one activation.
enum Admission {
    Lead(FetchPlan, CompletionHook),
    Follow,
}

/// Process-wide single-flight gate for one dependency.
///
/// Cloning is cheap; clones share the same in-flight state.
#[derive(Clone)]
pub struct LoadCoordinator {
    shared: Arc<GateShared>,
    probe: Arc<dyn ReadinessProbe>,
    initiator: LoadInitiator,
    settings: GateSettings,
    next_requester: Arc<AtomicU64>,
}

impl LoadCoordinator {
    /// Create a gate for the dependency observed by `probe`.
    pub fn new(
        probe: Arc<dyn ReadinessProbe>,
        initiator: LoadInitiator,
        settings: GateSettings,
    ) -> Self {
        Self {
            shared: Arc::new(GateShared::new()),
            probe,
            initiator,
            settings,
            next_requester: Arc::new(AtomicU64::new(1)),
        }
    }

    /// The gate's timing settings.
    pub fn settings(&self) -> &GateSettings {
        &self.settings
    }

    /// The initiator used by the leader.
    pub fn initiator(&self) -> &LoadInitiator {
        &self.initiator
    }

    /// Whether the dependency is usable right now.
    pub fn is_ready(&self) -> bool {
        self.probe.is_ready()
    }

    /// Snapshot of the shared state.
    pub fn stats(&self) -> GateStats {
        let state = self.shared.lock();
        GateStats {
            phase: state.phase,
            hook_registered: state.hook_slot.is_some(),
            loads_issued: state.loads_issued,
            ready_notifications: self.shared.ready_notifications.load(Ordering::Relaxed),
            stall_warnings: self.shared.stall_warnings.load(Ordering::Relaxed),
        }
    }

    /// Activate one requester.
    ///
    /// Must be called from within a tokio runtime whenever the dependency
    /// is not yet ready, since waiting requesters poll on timers.
    ///
    /// # Errors
    ///
    /// - `MissingIdentifier` if the dependency is not ready and `options`
    ///   carries no identifier. Nothing is scheduled.
    /// - `NoRuntime` if polling is needed outside a tokio runtime.
    /// - `InvalidAddress` if this requester would lead and the fetch
    ///   location is not a valid URL. The gate stays idle.
    pub fn activate(&self, options: &LoadOptions) -> Result<Requester> {
        let id = RequesterId(self.next_requester.fetch_add(1, Ordering::Relaxed));
        let fired = Arc::clone(&self.shared.ready_notifications);

        if !self.probe.is_interactive() {
            debug!("Requester {} activated without an interactive host", id);
            return Ok(Requester::idle(
                id,
                ReadyNotifier::new(LoadState::Unstarted, fired),
            ));
        }

        if self.probe.is_ready() {
            debug!("Requester {} found dependency ready", id);
            return Ok(Requester::idle(
                id,
                ReadyNotifier::new(LoadState::Ready, fired),
            ));
        }

        let identifier = options.identifier().ok_or(GateError::MissingIdentifier)?;
        let runtime = Handle::try_current().map_err(|_| GateError::NoRuntime)?;

        let admission = self.admit(identifier, options.alternate_address())?;
        let role = match admission {
            Admission::Lead(..) => Role::Leader,
            Admission::Follow => Role::Follower,
        };
        let notifier = ReadyNotifier::new(LoadState::Loading(role), fired);
        let timer = PollCycle::new(
            id,
            role,
            Arc::clone(&self.probe),
            Arc::clone(&self.shared),
            notifier.clone(),
            self.settings,
        )
        .schedule(&runtime);

        // The lock is released here, so a loader may fire the hook inline.
        if let Admission::Lead(plan, hook) = admission {
            debug!("Requester {} leads the load", id);
            self.initiator.begin(plan, hook);
            Ok(Requester::leader(id, notifier, timer))
        } else {
            debug!("Requester {} follows the in-flight load", id);
            Ok(Requester::follower(id, notifier, timer))
        }
    }

    /// Check-then-set of the in-flight flag, in one critical section.
    fn admit(&self, identifier: &str, alternate: Option<&str>) -> Result<Admission> {
        let mut state = self.shared.lock();
        if state.phase != LoadPhase::Idle {
            return Ok(Admission::Follow);
        }

        let plan = self.initiator.plan(identifier, alternate)?;
        let hook_id = state.next_hook_id;
        state.next_hook_id += 1;
        state.hook_slot = Some(hook_id);
        state.phase = LoadPhase::InFlight;
        state.loads_issued += 1;

        let hook = CompletionHook::new(hook_id, plan.callback.clone(), Arc::clone(&self.shared));
        Ok(Admission::Lead(plan, hook))
    }
}

impl std::fmt::Debug for LoadCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadCoordinator")
            .field("settings", &self.settings)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}
