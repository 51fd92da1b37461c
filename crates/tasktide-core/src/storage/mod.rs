mod config;

pub use config::{Config, SyncConfig, TimerConfig};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the tasktide data directory, creating it if needed.
///
/// `TASKTIDE_HOME` wins when set. Otherwise `~/.config/tasktide[-dev]/`,
/// where `TASKTIDE_ENV=dev` selects the development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("TASKTIDE_HOME") {
        Some(home) if !home.is_empty() => PathBuf::from(home),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("TASKTIDE_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("tasktide-dev")
            } else {
                base_dir.join("tasktide")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
