//! Readiness probes.
//!
//! A [`ReadinessProbe`] answers one question: is the dependency usable
//! right now? Probes must be side-effect free and cheap, because every
//! poll cycle calls them on each tick.
//!
//! Readiness is derived, never stored. Once a probe reports ready it is
//! expected to stay ready for the lifetime of the process.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use loadgate::environment::Environment;
//! use loadgate::probe::{EntryPointProbe, ReadinessProbe};
//!
//! let env = Arc::new(Environment::interactive());
//! let probe = EntryPointProbe::new(Arc::clone(&env), "BMapGL", "Map");
//! assert!(!probe.is_ready());
//!
//! env.install("BMapGL", ["Map"]);
//! assert!(probe.is_ready());
//! ```

use std::sync::Arc;

use crate::environment::Environment;

/// Side-effect-free check of whether the dependency is usable.
pub trait ReadinessProbe: Send + Sync {
    /// Whether the dependency's functional surface is present.
    fn is_ready(&self) -> bool;

    /// Whether there is a stateful host to load into at all.
    ///
    /// A non-interactive context is permanently not ready and the
    /// coordinator does nothing for it.
    fn is_interactive(&self) -> bool {
        true
    }
}

impl<F> ReadinessProbe for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn is_ready(&self) -> bool {
        self()
    }
}

/// Ready when a namespace in the [`Environment`] exposes an entry point.
///
/// Checks the entry point itself rather than the namespace, so a
/// half-installed dependency is still reported as not ready.
#[derive(Debug, Clone)]
pub struct EntryPointProbe {
    env: Arc<Environment>,
    namespace: String,
    entry_point: String,
}

impl EntryPointProbe {
    /// Create a probe for `namespace.entry_point`.
    pub fn new(
        env: Arc<Environment>,
        namespace: impl Into<String>,
        entry_point: impl Into<String>,
    ) -> Self {
        Self {
            env,
            namespace: namespace.into(),
            entry_point: entry_point.into(),
        }
    }

    /// The namespace this probe inspects.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The entry point that must be exposed.
    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }
}

impl ReadinessProbe for EntryPointProbe {
    fn is_ready(&self) -> bool {
        self.env.is_interactive() && self.env.exposes(&self.namespace, &self.entry_point)
    }

    fn is_interactive(&self) -> bool {
        self.env.is_interactive()
    }
}
