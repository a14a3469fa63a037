mod config;

pub use config::{Config, CountdownConfig, CountdownSettings, NotificationsConfig, PollConfig};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the deepwork data directory, creating it if needed.
///
/// `DEEPWORK_DATA_DIR` overrides the location outright. Otherwise the
/// directory is `~/.config/deepwork/`, or `~/.config/deepwork-dev/` when
/// `DEEPWORK_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("DEEPWORK_DATA_DIR") {
        Some(custom) if !custom.is_empty() => PathBuf::from(custom),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("DEEPWORK_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("deepwork-dev")
            } else {
                base_dir.join("deepwork")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
