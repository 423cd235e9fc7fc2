//! Configuration file discovery and loading.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::GateConfig;
use crate::error::{GateError, Result};

/// File name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "loadgate.yml";

/// Path of the config file for `root`, if one exists.
pub fn find_config(root: &Path) -> Option<PathBuf> {
    let path = root.join(CONFIG_FILE_NAME);
    if path.is_file() {
        Some(path)
    } else {
        None
    }
}

/// Load a single config file and parse it into GateConfig.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<GateConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            GateError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            GateError::Io(e)
        }
    })?;

    parse_config(&content, path)
}

/// Parse YAML content into GateConfig.
///
/// # Arguments
///
/// * `content` - The YAML content to parse
/// * `source_path` - Path for error reporting
pub fn parse_config(content: &str, source_path: &Path) -> Result<GateConfig> {
    // An empty file deserializes as YAML null, not an empty mapping.
    if content.trim().is_empty() {
        return Ok(GateConfig::default());
    }

    serde_yaml::from_str(content).map_err(|e| GateError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load config with optional path override.
///
/// If `config_override` is provided, that file must exist. Otherwise
/// `loadgate.yml` in `root` is used when present, and defaults when not.
/// The result is validated either way.
pub fn load_config(config_override: Option<&Path>, root: &Path) -> Result<GateConfig> {
    let config = match config_override.map(Path::to_path_buf).or_else(|| find_config(root)) {
        Some(path) => {
            tracing::debug!("Loading config from {}", path.display());
            load_config_file(&path)?
        }
        None => GateConfig::default(),
    };

    config.validate()?;
    Ok(config)
}
