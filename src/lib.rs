//! loadgate - Load a shared dependency once and tell every requester when it is ready.
//!
//! Any number of requesters may ask for the same lazily-loaded dependency.
//! The first one to arrive while nothing is in flight becomes the leader and
//! starts the one and only fetch. Everyone else follows: they re-check a
//! readiness probe on a fixed interval until it reports the dependency's
//! entry point as usable, and then flip their own state to ready exactly once.
//!
//! # Modules
//!
//! - [`coordinator`] - The load gate and requester activation
//! - [`requester`] - Per-requester handle, readiness and teardown
//! - [`notifier`] - One-shot ready transitions observed through a watch channel
//! - [`poll`] - Periodic readiness re-checks and their cancellable timers
//! - [`probe`] - Readiness probes
//! - [`initiator`] - Fetch plans and the [`Loader`](initiator::Loader) seam
//! - [`hook`] - Single-use completion hooks fired by loaders
//! - [`http`] - A loader that fetches a JSON manifest over HTTP
//! - [`environment`] - The process-wide namespace a loaded dependency installs into
//! - [`config`] - Configuration loading, parsing, and validation
//! - [`cli`] - Command-line interface and argument parsing
//! - [`error`] - Error types and result aliases
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use loadgate::{Endpoint, GateSettings, LoadCoordinator, LoadInitiator, LoadOptions};
//! use loadgate::{CompletionHook, FetchPlan, Loader};
//!
//! struct Noop;
//! impl Loader for Noop {
//!     fn begin(&self, _plan: FetchPlan, _hook: CompletionHook) {}
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let gate = LoadCoordinator::new(
//!     Arc::new(|| false),
//!     LoadInitiator::new(Endpoint::default(), Arc::new(Noop)),
//!     GateSettings::default(),
//! );
//!
//! let first = gate.activate(&LoadOptions::new("abc")).unwrap();
//! let second = gate.activate(&LoadOptions::new("abc")).unwrap();
//! assert!(first.state().is_loading());
//! assert!(second.state().is_loading());
//! assert_eq!(gate.stats().loads_issued, 1);
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod coordinator;
pub mod environment;
pub mod error;
pub mod hook;
pub mod http;
pub mod initiator;
pub mod notifier;
pub mod poll;
pub mod probe;
pub mod requester;

pub use coordinator::{
    GateSettings, GateStats, LoadCoordinator, LoadOptions, LoadPhase, DEFAULT_POLL_INTERVAL,
};
pub use environment::Environment;
pub use error::{GateError, Result};
pub use hook::CompletionHook;
pub use http::{HttpLoader, Manifest};
pub use initiator::{Endpoint, FetchPlan, LoadInitiator, Loader, SharedKey};
pub use notifier::{LoadState, ReadySignal, Role};
pub use poll::TimerHandle;
pub use probe::{EntryPointProbe, ReadinessProbe};
pub use requester::{Requester, RequesterId};
