//! Configuration system.
//!
//! Values are resolved with a clear supersedence hierarchy (highest
//! priority wins):
//!
//! 1. **Code** (builder-style overrides)
//! 2. **Environment variables** (`BD_*`)
//! 3. **Config file** (`bikedream.toml`)
//! 4. **Defaults**

pub mod auth;
pub mod scheduler;
pub mod server;
pub mod storage;

pub use auth::AuthConfig;
pub use scheduler::SchedulerConfig;
pub use server::ServerConfig;
pub use storage::StorageConfig;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BikeDreamConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub scheduler: SchedulerConfig,
}

impl BikeDreamConfig {
    /// Load configuration with the full supersedence chain, starting from
    /// `bikedream.toml` in the working directory.
    pub fn load() -> Result<Self> {
        Self::load_from("bikedream.toml")
    }

    /// Load configuration from a specific file, then apply env overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let mut config = Self::default();
        if path.exists() {
            config = Self::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
        }
        config.apply_env_vars();
        Ok(config)
    }

    /// Parse a TOML config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config: {}", path.as_ref().display()))
    }

    /// Apply environment variables to every section.
    pub fn apply_env_vars(&mut self) {
        self.server.apply_env_vars();
        self.auth.apply_env_vars();
        self.storage.apply_env_vars();
        self.scheduler.apply_env_vars();
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        self.server.validate()?;
        self.auth.validate()?;
        self.storage.validate()?;
        self.scheduler.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = BikeDreamConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let config = BikeDreamConfig::load_from("/nonexistent/bikedream.toml").unwrap();
        assert_eq!(config.server.port, ServerConfig::default().port);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bikedream.toml");
        std::fs::write(&path, "[server]\nport = 9001\n").unwrap();

        let config = BikeDreamConfig::load_from(&path).unwrap();
        assert_eq!(config.server.port, 9001);
        assert_eq!(config.scheduler.workers, SchedulerConfig::default().workers);
    }
}
