//! HTTP-backed loader.
//!
//! [`HttpLoader`] fetches a bootstrap manifest and installs the namespace
//! it describes into an [`Environment`]. The manifest is JSON:
//!
//! ```json
//! { "namespace": "BMapGL", "exports": ["Map", "Point"], "callback": "MapApiLoaderCallback" }
//! ```
//!
//! The completion hook fires only when the manifest names the plan's
//! callback, the same way a fetched script only calls back if it knows
//! the callback name. A manifest without it still installs the namespace,
//! and polling picks up readiness.
//!
//! Fetch failures are logged and swallowed. The hook never fires and the
//! load stays in flight.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::environment::Environment;
use crate::hook::CompletionHook;
use crate::initiator::{FetchPlan, Loader};

/// Bootstrap manifest returned by the fetch target.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Manifest {
    /// Namespace to install.
    pub namespace: String,
    /// Entry points the namespace exposes.
    #[serde(default)]
    pub exports: Vec<String>,
    /// Callback the resource invokes when it finishes loading.
    #[serde(default)]
    pub callback: Option<String>,
}

/// Loads the dependency over HTTP on a background thread.
#[derive(Debug, Clone)]
pub struct HttpLoader {
    env: Arc<Environment>,
    timeout: Duration,
}

impl HttpLoader {
    /// Create a loader with the default 30-second timeout.
    pub fn new(env: Arc<Environment>) -> Self {
        Self::with_timeout(env, Duration::from_secs(30))
    }

    /// Create a loader with a custom timeout.
    pub fn with_timeout(env: Arc<Environment>, timeout: Duration) -> Self {
        Self { env, timeout }
    }

    /// Get the configured timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetch and parse the manifest at `url`.
    ///
    /// Blocking. Must not be called from an async context.
    pub fn fetch_manifest(&self, url: &str) -> Result<Manifest> {
        let client = Client::builder()
            .user_agent("loadgate")
            .timeout(self.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        let response = client.get(url).send()?;
        if !response.status().is_success() {
            bail!("HTTP {} fetching {}", response.status(), url);
        }

        let body = response.text()?;
        serde_json::from_str(&body).with_context(|| format!("Invalid manifest from {}", url))
    }

    /// Publish, fetch, install, and call back if the manifest says so.
    fn load(&self, plan: FetchPlan, hook: CompletionHook) {
        if let Some(key) = &plan.shared_key {
            self.env.set_slot(key.slot.clone(), key.value.clone());
        }

        let manifest = match self.fetch_manifest(&plan.target) {
            Ok(manifest) => manifest,
            Err(e) => {
                tracing::warn!("Failed to load dependency from {}: {:#}", plan.target, e);
                return;
            }
        };

        self.env
            .install(&manifest.namespace, manifest.exports.iter().cloned());
        tracing::debug!(
            "Installed namespace '{}' with {} export(s)",
            manifest.namespace,
            manifest.exports.len()
        );

        if manifest.callback.as_deref() == Some(hook.callback_name()) {
            hook.fire();
        } else {
            tracing::debug!(
                "Manifest from {} does not call back '{}'",
                plan.target,
                hook.callback_name()
            );
        }
    }
}

impl Loader for HttpLoader {
    fn begin(&self, plan: FetchPlan, hook: CompletionHook) {
        let loader = self.clone();
        let spawned = std::thread::Builder::new()
            .name("loadgate-fetch".to_string())
            .spawn(move || loader.load(plan, hook));
        if let Err(e) = spawned {
            tracing::warn!("Failed to start fetch thread: {}", e);
        }
    }
}
