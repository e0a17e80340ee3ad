//! Configuration loading and config file resolution

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Logging configuration shared by every binary in the workspace
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Config file resolution following this priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. Per-user config directory (`<config_dir>/<app>/config.toml`)
/// 4. System-wide config (`/etc/<app>/config.toml`, Unix only)
///
/// Returns `None` when nothing is found; callers fall back to built-in defaults.
pub struct ConfigFileResolver {
    app_name: String,
    env_var_name: String,
}

impl ConfigFileResolver {
    /// Create a resolver for `app_name`, reading overrides from `env_var_name`
    pub fn new(app_name: impl Into<String>, env_var_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            env_var_name: env_var_name.into(),
        }
    }

    /// Resolve the config file path
    ///
    /// An explicit CLI path or env var path is returned even when the file does
    /// not exist, so the caller can report it. Discovered default locations are
    /// only returned when present.
    pub fn resolve(&self, cli_arg: Option<&Path>) -> Option<PathBuf> {
        // Priority 1: Command-line argument
        if let Some(path) = cli_arg {
            debug!("Config file from command line: {}", path.display());
            return Some(path.to_path_buf());
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(&self.env_var_name) {
            if !path.trim().is_empty() {
                debug!("Config file from {}: {}", self.env_var_name, path);
                return Some(PathBuf::from(path));
            }
        }

        // Priority 3: Per-user config directory
        if let Some(user_config) = dirs::config_dir().map(|d| d.join(&self.app_name).join("config.toml")) {
            if user_config.exists() {
                return Some(user_config);
            }
        }

        // Priority 4: System-wide config
        if cfg!(unix) {
            let system_config = PathBuf::from("/etc").join(&self.app_name).join("config.toml");
            if system_config.exists() {
                return Some(system_config);
            }
        }

        None
    }
}

/// Parse a TOML config file into `T`
pub fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;
    info!("Configuration loaded from {}", path.display());
    Ok(config)
}

/// Load `T` from the resolved config file, or built-in defaults when none exists
///
/// A file that exists but cannot be parsed is an error (fail-fast on
/// misconfiguration). A path that was explicitly requested but is missing is
/// also an error; a missing discovered file is not.
pub fn load_or_default<T: DeserializeOwned + Default>(
    resolver: &ConfigFileResolver,
    cli_arg: Option<&Path>,
) -> Result<T> {
    match resolver.resolve(cli_arg) {
        Some(path) => {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            load_toml(&path)
        }
        None => {
            warn!("No config file found, using built-in defaults");
            Ok(T::default())
        }
    }
}
