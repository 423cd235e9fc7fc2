//! Configuration schema for `loadgate.yml`.
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration. Only the identifier has no useful default; whether its
//! absence is an error is decided at activation time.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::coordinator::{GateSettings, LoadOptions, DEFAULT_POLL_INTERVAL};
use crate::error::{GateError, Result};
use crate::initiator::Endpoint;

/// Root configuration structure for loadgate.yml
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Identifier (credential) for the dependency fetch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,

    /// Bootstrap address replacing the default endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternate_address: Option<String>,

    /// Delay between readiness checks, in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Warn once when a requester has waited this long, in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stall_warning_ms: Option<u64>,

    /// Timeout for the bootstrap HTTP request, in seconds
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Default fetch location
    pub endpoint: EndpointConfig,

    /// What must be exposed for the dependency to count as ready
    pub readiness: ReadinessConfig,
}

/// Shape of the default fetch location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Base URL
    pub url: String,

    /// Fixed query parameters, in order (`[[type, webgl], [v, "1.0"]]`)
    pub query: Vec<(String, String)>,

    /// Query parameter carrying the identifier
    pub identifier_param: String,

    /// Callback name the loaded resource invokes
    pub callback_name: String,

    /// Shared slot receiving the identifier when an alternate address is used
    pub shared_key_slot: String,
}

/// Readiness criteria.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessConfig {
    /// Namespace the dependency installs
    pub namespace: String,

    /// Entry point that must exist in the namespace
    pub entry_point: String,
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL.as_millis() as u64
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            identifier: None,
            alternate_address: None,
            poll_interval_ms: default_poll_interval_ms(),
            stall_warning_ms: None,
            fetch_timeout_secs: default_fetch_timeout_secs(),
            endpoint: EndpointConfig::default(),
            readiness: ReadinessConfig::default(),
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        let endpoint = Endpoint::default();
        Self {
            url: endpoint.base,
            query: endpoint.query,
            identifier_param: endpoint.identifier_param,
            callback_name: endpoint.callback_name,
            shared_key_slot: endpoint.shared_key_slot,
        }
    }
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            namespace: "BMapGL".to_string(),
            entry_point: "Map".to_string(),
        }
    }
}

impl GateConfig {
    /// Check values that would make the gate misbehave.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(GateError::ConfigValidationError {
                message: "poll_interval_ms must be greater than zero".to_string(),
            });
        }
        if self.readiness.namespace.is_empty() || self.readiness.entry_point.is_empty() {
            return Err(GateError::ConfigValidationError {
                message: "readiness.namespace and readiness.entry_point are required".to_string(),
            });
        }
        if self.endpoint.callback_name.is_empty() {
            return Err(GateError::ConfigValidationError {
                message: "endpoint.callback_name must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Timing settings for the gate.
    pub fn settings(&self) -> GateSettings {
        GateSettings {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            stall_warning: self.stall_warning_ms.map(Duration::from_millis),
        }
    }

    /// Default fetch location shape.
    pub fn endpoint(&self) -> Endpoint {
        Endpoint {
            base: self.endpoint.url.clone(),
            query: self.endpoint.query.clone(),
            identifier_param: self.endpoint.identifier_param.clone(),
            callback_name: self.endpoint.callback_name.clone(),
            shared_key_slot: self.endpoint.shared_key_slot.clone(),
        }
    }

    /// Activation inputs.
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            identifier: self.identifier.clone(),
            alternate_address: self.alternate_address.clone(),
        }
    }

    /// Timeout for the bootstrap HTTP request.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}
