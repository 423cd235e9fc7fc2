//! Configuration loading and parsing for loadgate.
//!
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//!
//! # Example
//!
//! ```
//! use loadgate::config::load_config;
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! fs::write(temp.path().join("loadgate.yml"), "identifier: abc123\npoll_interval_ms: 100").unwrap();
//!
//! let config = load_config(None, temp.path()).unwrap();
//! assert_eq!(config.identifier, Some("abc123".to_string()));
//! assert_eq!(config.settings().poll_interval.as_millis(), 100);
//! ```

pub mod loader;
pub mod schema;

pub use loader::{find_config, load_config, load_config_file, parse_config, CONFIG_FILE_NAME};
pub use schema::{EndpointConfig, GateConfig, ReadinessConfig};
