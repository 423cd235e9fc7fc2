//! One-shot load initiation.
//!
//! The [`LoadInitiator`] turns an identifier and an optional alternate
//! bootstrap address into a [`FetchPlan`] and hands it, together with the
//! leader's [`CompletionHook`], to a [`Loader`].
//!
//! Two fetch shapes exist:
//!
//! - **Default**: the configured endpoint, with the fixed query parameters
//!   followed by the identifier and the callback name.
//! - **Alternate**: the alternate address verbatim. The identifier is not
//!   embedded in it; it travels in [`FetchPlan::shared_key`] so the loader
//!   can publish it to a shared configuration slot.
//!
//! # Example
//!
//! ```
//! use loadgate::initiator::Endpoint;
//!
//! let endpoint = Endpoint::default();
//! let plan = endpoint.plan("abc123", None).unwrap();
//! assert_eq!(
//!     plan.target,
//!     "https://api.map.baidu.com/api?type=webgl&v=1.0&ak=abc123&callback=MapApiLoaderCallback"
//! );
//! assert!(plan.shared_key.is_none());
//! ```

use std::sync::Arc;

use serde::Serialize;
use url::Url;

use crate::error::{GateError, Result};
use crate::hook::CompletionHook;

/// Side effect that fetches and installs the dependency.
///
/// `begin` is fire-and-forget: there is no result and no error channel.
/// The only observable outcomes are the hook eventually firing, or never
/// firing. Implementations must not block the caller.
pub trait Loader: Send + Sync {
    /// Start loading according to `plan`.
    fn begin(&self, plan: FetchPlan, hook: CompletionHook);
}

/// Identifier published through a shared configuration slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SharedKey {
    /// Name of the slot to write.
    pub slot: String,
    /// The identifier.
    pub value: String,
}

/// Everything a loader needs to fetch the dependency once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchPlan {
    /// Address to fetch.
    pub target: String,
    /// Identifier to publish before fetching (alternate address only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_key: Option<SharedKey>,
    /// Callback name the fetched resource calls when it completes.
    pub callback: String,
}

/// Shape of the default fetch location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Base address of the default fetch location.
    pub base: String,
    /// Fixed query parameters, in order.
    pub query: Vec<(String, String)>,
    /// Query parameter carrying the identifier.
    pub identifier_param: String,
    /// Callback name passed in the `callback` parameter.
    pub callback_name: String,
    /// Shared slot used for the identifier with an alternate address.
    pub shared_key_slot: String,
}

impl Default for Endpoint {
    fn default() -> Self {
        Self {
            base: "https://api.map.baidu.com/api".to_string(),
            query: vec![
                ("type".to_string(), "webgl".to_string()),
                ("v".to_string(), "1.0".to_string()),
            ],
            identifier_param: "ak".to_string(),
            callback_name: "MapApiLoaderCallback".to_string(),
            shared_key_slot: "BMAP_AUTHENTIC_KEY".to_string(),
        }
    }
}

impl Endpoint {
    /// Build the fetch plan for `identifier`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAddress` if the base or the alternate address is not
    /// an absolute URL.
    pub fn plan(&self, identifier: &str, alternate: Option<&str>) -> Result<FetchPlan> {
        if let Some(address) = alternate {
            parse_address(address)?;
            return Ok(FetchPlan {
                target: address.to_string(),
                shared_key: Some(SharedKey {
                    slot: self.shared_key_slot.clone(),
                    value: identifier.to_string(),
                }),
                callback: self.callback_name.clone(),
            });
        }

        let mut url = parse_address(&self.base)?;
        url.query_pairs_mut()
            .extend_pairs(self.query.iter())
            .append_pair(&self.identifier_param, identifier)
            .append_pair("callback", &self.callback_name);

        Ok(FetchPlan {
            target: url.to_string(),
            shared_key: None,
            callback: self.callback_name.clone(),
        })
    }
}

fn parse_address(address: &str) -> Result<Url> {
    Url::parse(address).map_err(|e| GateError::InvalidAddress {
        address: address.to_string(),
        message: e.to_string(),
    })
}

/// Issues the one load for a dependency.
#[derive(Clone)]
pub struct LoadInitiator {
    endpoint: Endpoint,
    loader: Arc<dyn Loader>,
}

impl LoadInitiator {
    /// Create an initiator that loads through `loader`.
    pub fn new(endpoint: Endpoint, loader: Arc<dyn Loader>) -> Self {
        Self { endpoint, loader }
    }

    /// The default fetch location shape.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Build the fetch plan without issuing anything.
    pub fn plan(&self, identifier: &str, alternate: Option<&str>) -> Result<FetchPlan> {
        self.endpoint.plan(identifier, alternate)
    }

    /// Hand a prepared plan and the completion hook to the loader.
    pub fn begin(&self, plan: FetchPlan, hook: CompletionHook) {
        tracing::info!("Issuing load from {}", plan.target);
        self.loader.begin(plan, hook);
    }
}

impl std::fmt::Debug for LoadInitiator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadInitiator")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}
