mod config;
pub mod database;
mod settings;
mod snapshot;
mod store;

pub use config::{Config, FeedbackConfig, PersistenceConfig, TimerConfig, VoiceConfig};
pub use database::Database;
pub use settings::{bg_image_data_uri, CosmeticSettings, DEFAULT_BG_COLOR, DEFAULT_MESSAGE};
pub use snapshot::PersistedSnapshot;
pub use store::{MemoryStore, SnapshotStore};

use std::path::PathBuf;

use crate::error::Result;

/// Returns `~/.config/lapwatch[-dev]/` based on LAPWATCH_ENV.
///
/// Set LAPWATCH_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("LAPWATCH_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("lapwatch-dev")
    } else {
        base_dir.join("lapwatch")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
