//! Configuration for the embedded runtime.
//!
//! This module defines [`BridgeConfig`], the settings consumed by the
//! lifecycle manager at `initialize()` time. It can be loaded from a TOML
//! file or built in code.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::BridgeError;

/// Environment variable overriding the baked-in runtime-home path.
///
/// Honored at `initialize()` time when no explicit override was configured.
pub const HOME_ENV_VAR: &str = "SCRIPTBRIDGE_HOME";

/// Baked-in default runtime-home path.
///
/// Used only when neither an explicit override nor [`HOME_ENV_VAR`] is
/// present, and only if the directory actually exists on this host.
pub const DEFAULT_HOME: &str = "/usr/local/share/scriptbridge";

/// Bridge configuration.
///
/// The runtime home is the first entry of the module search path; the
/// current working directory is always appended after it at initialize time.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BridgeConfig {
    /// Explicit runtime-home override.
    ///
    /// Takes precedence over both [`HOME_ENV_VAR`] and [`DEFAULT_HOME`].
    #[serde(default)]
    pub home_override: Option<PathBuf>,

    /// File extensions tried, in order, when locating a script module.
    #[serde(default = "defaults::module_extensions")]
    pub module_extensions: Vec<String>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            home_override: None,
            module_extensions: defaults::module_extensions(),
        }
    }
}

impl BridgeConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a [`BridgeError::Boot`] if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, BridgeError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            BridgeError::boot(format!(
                "cannot read config file {}: {e}",
                path.as_ref().display()
            ))
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a [`BridgeError::Boot`] if the string is not valid TOML.
    pub fn from_toml(content: &str) -> Result<Self, BridgeError> {
        toml::from_str(content).map_err(|e| BridgeError::boot(format!("invalid config: {e}")))
    }

    /// Resolve the runtime-home directory.
    ///
    /// Precedence: explicit override, then [`HOME_ENV_VAR`], then
    /// [`DEFAULT_HOME`]. Explicit and environment overrides must name an
    /// existing directory; the baked-in default is skipped silently when it
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::HomeOverrideInvalid`] when an explicit or
    /// environment override does not name a directory.
    pub fn resolved_home(&self) -> Result<Option<PathBuf>, BridgeError> {
        self.resolve_home(std::env::var_os(HOME_ENV_VAR).map(PathBuf::from))
    }

    fn resolve_home(&self, env_home: Option<PathBuf>) -> Result<Option<PathBuf>, BridgeError> {
        if let Some(path) = &self.home_override {
            if !path.is_dir() {
                return Err(BridgeError::HomeOverrideInvalid { path: path.clone() });
            }
            return Ok(Some(path.clone()));
        }

        if let Some(path) = env_home {
            if !path.is_dir() {
                return Err(BridgeError::HomeOverrideInvalid { path });
            }
            return Ok(Some(path));
        }

        let default = PathBuf::from(DEFAULT_HOME);
        if default.is_dir() {
            Ok(Some(default))
        } else {
            Ok(None)
        }
    }
}

/// Default value functions for serde.
mod defaults {
    pub fn module_extensions() -> Vec<String> {
        vec!["wasm".into(), "wat".into()]
    }
}
