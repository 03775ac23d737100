//! Configuration file loader for the `.agent-kit/` directory.
//!
//! The runtime reads a single file, `.agent-kit/config.toml`. Every key is
//! optional; a missing directory or file yields the default configuration.

use crate::config::error::ConfigError;
use crate::config::error::ConfigResult;
use ak_protocol::config_models::RuntimeConfig;
use std::path::Path;

/// Name of the configuration directory looked up under the project root.
pub const CONFIG_DIR: &str = ".agent-kit";

/// Name of the configuration file inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.toml";

/// Loads the runtime configuration from `<root>/.agent-kit/config.toml`.
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or is not
/// valid TOML for [`RuntimeConfig`].
///
/// # Example
///
/// ```rust,no_run
/// use ak_core::config::loader::load_config;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new(".")).await?;
/// println!("Grace period: {:?}", config.grace_period_ms);
/// # Ok(())
/// # }
/// ```
pub async fn load_config(root: &Path) -> ConfigResult<RuntimeConfig> {
    let config_path = root.join(CONFIG_DIR).join(CONFIG_FILE);

    if !config_path.exists() {
        tracing::debug!("No config at {}, using defaults", config_path.display());
        return Ok(RuntimeConfig::default());
    }

    load_config_file(&config_path)
}

/// Loads the runtime configuration from an explicit file path.
pub fn load_config_file(config_path: &Path) -> ConfigResult<RuntimeConfig> {
    let content =
        std::fs::read_to_string(config_path).map_err(|source| ConfigError::FileRead {
            path: config_path.to_path_buf(),
            source,
        })?;

    let config: RuntimeConfig =
        toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
            path: config_path.to_path_buf(),
            source,
        })?;

    tracing::debug!("Loaded runtime config from {}", config_path.display());
    Ok(config)
}
