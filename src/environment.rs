//! Shared host environment.
//!
//! An [`Environment`] is the process-wide state a dependency installs
//! itself into: named namespaces exposing entry points, plus named
//! configuration slots that a loader may read while bootstrapping.
//!
//! Readiness is never stored here directly. A probe derives it by
//! asking whether a namespace exposes an entry point (see
//! [`crate::probe::EntryPointProbe`]).
//!
//! # Example
//!
//! ```
//! use loadgate::environment::Environment;
//!
//! let env = Environment::interactive();
//! assert!(!env.exposes("BMapGL", "Map"));
//!
//! env.install("BMapGL", ["Map", "Point"]);
//! assert!(env.exposes("BMapGL", "Map"));
//! ```

use std::collections::{BTreeSet, HashMap};
use std::sync::{PoisonError, RwLock};

/// Process-wide host state shared by probes and loaders.
#[derive(Debug)]
pub struct Environment {
    interactive: bool,
    namespaces: RwLock<HashMap<String, BTreeSet<String>>>,
    slots: RwLock<HashMap<String, String>>,
}

impl Environment {
    /// Create an interactive environment that dependencies can install into.
    pub fn interactive() -> Self {
        Self::with_interactive(true)
    }

    /// Create an environment for a non-interactive context.
    ///
    /// Nothing can be installed into it, so it never reports an entry point.
    pub fn non_interactive() -> Self {
        Self::with_interactive(false)
    }

    fn with_interactive(interactive: bool) -> Self {
        Self {
            interactive,
            namespaces: RwLock::new(HashMap::new()),
            slots: RwLock::new(HashMap::new()),
        }
    }

    /// Whether this is a stateful, interactive host.
    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Install a namespace and its exports.
    ///
    /// Exports are merged with anything the namespace already exposes, so
    /// a namespace never loses an entry point once it has one.
    pub fn install<I, S>(&self, namespace: &str, exports: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !self.interactive {
            tracing::debug!("Ignoring install of '{}' in non-interactive environment", namespace);
            return;
        }

        let mut namespaces = self
            .namespaces
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        namespaces
            .entry(namespace.to_string())
            .or_default()
            .extend(exports.into_iter().map(Into::into));
    }

    /// Whether `namespace` is installed and exposes `entry_point`.
    pub fn exposes(&self, namespace: &str, entry_point: &str) -> bool {
        self.namespaces
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(namespace)
            .is_some_and(|exports| exports.contains(entry_point))
    }

    /// Write a named configuration slot.
    pub fn set_slot(&self, name: impl Into<String>, value: impl Into<String>) {
        self.slots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), value.into());
    }

    /// Read a named configuration slot.
    pub fn slot(&self, name: &str) -> Option<String> {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::interactive()
    }
}
