//! Storage configuration.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the JSON-lines snapshots.
    /// Env: BD_DATA_DIR
    pub data_dir: String,

    /// Interval between periodic snapshots, in seconds (0 disables the
    /// timer; a final snapshot is still written on shutdown).
    /// Env: BD_SNAPSHOT_INTERVAL
    pub snapshot_interval_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_dir: "./data/bikedream".to_string(), snapshot_interval_secs: 300 }
    }
}

impl StorageConfig {
    pub fn apply_env_vars(&mut self) {
        if let Ok(dir) = env::var("BD_DATA_DIR") {
            self.data_dir = dir;
        }
        if let Ok(interval) = env::var("BD_SNAPSHOT_INTERVAL") {
            if let Ok(i) = interval.parse() {
                self.snapshot_interval_secs = i;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.data_dir.is_empty() {
            bail!("Invalid data_dir: cannot be empty");
        }
        Ok(())
    }
}
