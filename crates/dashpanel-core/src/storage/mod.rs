mod config;
pub mod credentials;

pub use config::{ApiConfig, BroadcastsConfig, Config, DashboardConfig, LogConfig};

use std::path::PathBuf;

use crate::error::Result;

/// Returns `~/.config/dashpanel[-dev]/` based on DASHPANEL_ENV.
///
/// Set DASHPANEL_ENV=dev to use the development directory, or
/// DASHPANEL_CONFIG_DIR to point somewhere else entirely.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("DASHPANEL_CONFIG_DIR") {
        Some(custom) => PathBuf::from(custom),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("DASHPANEL_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("dashpanel-dev")
            } else {
                base_dir.join("dashpanel")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
