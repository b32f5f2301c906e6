//! Configuration loader and data directory resolution.
//!
//! Reads `config.toml` from the data directory (`~/.chatbox/` in production)
//! and deserializes it into [`ChatboxConfig`]. Falls back to defaults when the
//! file is missing or malformed; a file that parses but describes unusable page
//! sizes or limits is rejected.

use std::path::{Path, PathBuf};

use chatbox_types::config::ChatboxConfig;
use chatbox_types::error::ConfigError;

/// Load configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`ChatboxConfig::default()`].
/// - If the file exists but cannot be read or parsed, logs a warning and
///   returns the default.
/// - If the file parses, it is validated and returned.
pub async fn load_config(data_dir: &Path) -> Result<ChatboxConfig, ConfigError> {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return Ok(ChatboxConfig::default());
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return Ok(ChatboxConfig::default());
        }
    };

    let config = match toml::from_str::<ChatboxConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            return Ok(ChatboxConfig::default());
        }
    };

    config.validate()?;
    Ok(config)
}

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `CHATBOX_DATA_DIR` environment variable
/// 2. `~/.chatbox`
/// 3. `.chatbox` in the current directory
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CHATBOX_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".chatbox");
    }

    PathBuf::from(".chatbox")
}
