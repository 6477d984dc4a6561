//! Storage: SQLite session/pattern persistence and TOML configuration.

mod config;
pub mod database;
mod store;

pub use config::{AnalysisConfig, Config, ServerConfig, SummarizerConfig, TrackerConfig};
pub use database::SqliteStore;
pub use store::FlowStore;

use std::path::PathBuf;

/// Returns `~/.config/flowdeck[-dev]/` based on FLOWDECK_ENV.
///
/// Set FLOWDECK_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("FLOWDECK_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("flowdeck-dev")
    } else {
        base_dir.join("flowdeck")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
