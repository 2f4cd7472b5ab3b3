//! Update-scheduler configuration.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Interval between scheduled update passes, in seconds.
    /// Env: BD_UPDATE_INTERVAL
    pub interval_secs: u64,

    /// Bounded concurrency for per-manufacturer workers.
    /// Env: BD_UPDATE_WORKERS
    pub workers: usize,

    /// Whether the interval schedule is active (admin triggers always
    /// work).
    /// Env: BD_UPDATE_ENABLED
    pub enabled: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_secs: 24 * 60 * 60, // once per day
            workers: 4,
            enabled: true,
        }
    }
}

impl SchedulerConfig {
    pub fn apply_env_vars(&mut self) {
        if let Ok(interval) = env::var("BD_UPDATE_INTERVAL") {
            if let Ok(i) = interval.parse() {
                self.interval_secs = i;
            }
        }
        if let Ok(workers) = env::var("BD_UPDATE_WORKERS") {
            if let Ok(w) = workers.parse() {
                self.workers = w;
            }
        }
        if let Ok(enabled) = env::var("BD_UPDATE_ENABLED") {
            self.enabled = enabled.parse().unwrap_or(true);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.interval_secs == 0 {
            bail!("Invalid interval_secs: must be greater than 0");
        }
        if self.workers == 0 {
            bail!("Invalid workers: must be at least 1");
        }
        Ok(())
    }
}
