//! Configuration file loading and setting resolution
//!
//! Settings resolve in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Values readable from the TOML config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    /// Base URL of the Media API backend
    pub media_api_url: Option<String>,
    /// Port the gallery service listens on
    pub port: Option<u16>,
    /// Model identifier forwarded to AI generation endpoints
    pub ai_model: Option<String>,
}

impl FileConfig {
    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw)
            .map_err(|e| Error::Config(format!("invalid config file {}: {}", path.display(), e)))
    }

    /// Load from the default platform location.
    ///
    /// A missing file is normal (all defaults apply); an unreadable file is
    /// logged and ignored rather than blocking startup.
    pub fn load_default() -> Self {
        match default_config_path() {
            Some(path) if path.exists() => match Self::load(&path) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Ignoring unreadable config file: {}", e);
                    Self::default()
                }
            },
            _ => Self::default(),
        }
    }
}

/// Default configuration file path for the platform
/// (e.g. `~/.config/imirror/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("imirror").join("config.toml"))
}

/// Resolve a single string setting following the priority order
pub fn resolve_setting(
    cli_arg: Option<&str>,
    env_var_name: &str,
    file_value: Option<&str>,
    default: &str,
) -> String {
    if let Some(value) = cli_arg {
        return value.to_string();
    }
    if let Ok(value) = std::env::var(env_var_name) {
        return value;
    }
    if let Some(value) = file_value {
        return value.to_string();
    }
    default.to_string()
}
