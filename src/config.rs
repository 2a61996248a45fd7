//! Configuration file loading.

use anyhow::{Context, Result};
use std::path::Path;

pub use cf_core::config::*;

/// Default config locations, searched in order.
pub const DEFAULT_PATHS: [&str; 3] = [
    "./clipforge.toml",
    "~/.config/clipforge/config.toml",
    "/etc/clipforge/config.toml",
];

/// Load configuration from a TOML file.
///
/// Problems that do not prevent running (a configured tool path that does
/// not exist, a zero timeout) are logged as warnings.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    for warning in config.validate() {
        tracing::warn!(config = %path.display(), "{warning}");
    }

    Ok(config)
}

/// Load config from `custom_path`, else the first default location that
/// exists, else the built-in defaults.
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    for path_str in DEFAULT_PATHS {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!(config = %path.display(), "using config file");
            return load_config(path);
        }
    }

    Ok(Config::default())
}
