//! Completion hook handed to a loader.
//!
//! The leader registers exactly one [`CompletionHook`] when it issues the
//! load. Firing it is the only way the in-flight flag is ever cleared.
//! The hook is consumed by [`CompletionHook::fire`], so it can run at most
//! once; a loader that drops it without firing leaves the load in flight
//! and readiness to the poll cycles.

use std::fmt;
use std::sync::Arc;

use crate::coordinator::GateShared;

/// Single-use callback that marks the in-flight load as completed.
pub struct CompletionHook {
    id: u64,
    callback_name: String,
    gate: Arc<GateShared>,
}

impl CompletionHook {
    pub(crate) fn new(id: u64, callback_name: impl Into<String>, gate: Arc<GateShared>) -> Self {
        Self {
            id,
            callback_name: callback_name.into(),
            gate,
        }
    }

    /// Name under which the loaded resource is expected to call back.
    pub fn callback_name(&self) -> &str {
        &self.callback_name
    }

    /// Signal that the loader finished.
    ///
    /// Clears the in-flight flag and the registered hook slot, then wakes
    /// every live poll cycle so they re-check readiness early. Completion
    /// does not imply readiness; pollers still consult the probe.
    pub fn fire(self) {
        self.gate.settle(self.id, &self.callback_name);
    }
}

impl fmt::Debug for CompletionHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionHook")
            .field("id", &self.id)
            .field("callback_name", &self.callback_name)
            .finish()
    }
}
