//! HTTP server configuration.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server listening port.
    /// Env: BD_PORT
    pub port: u16,

    /// Server listening address.
    /// Env: BD_HOST
    pub host: String,

    /// Per-request deadline in seconds; the handler is aborted on expiry.
    /// Env: BD_REQUEST_TIMEOUT
    pub request_timeout_secs: u64,

    /// Maximum request body size in bytes.
    /// Env: BD_MAX_BODY_SIZE
    pub max_body_size: usize,

    /// Per-user mutation budget per minute (0 disables rate limiting).
    /// Env: BD_MUTATIONS_PER_MINUTE
    pub mutations_per_minute: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            request_timeout_secs: 30,
            max_body_size: 1024 * 1024, // 1 MB
            mutations_per_minute: 100,
        }
    }
}

impl ServerConfig {
    pub fn apply_env_vars(&mut self) {
        if let Ok(port) = env::var("BD_PORT") {
            if let Ok(p) = port.parse() {
                self.port = p;
            }
        }
        if let Ok(host) = env::var("BD_HOST") {
            self.host = host;
        }
        if let Ok(timeout) = env::var("BD_REQUEST_TIMEOUT") {
            if let Ok(t) = timeout.parse() {
                self.request_timeout_secs = t;
            }
        }
        if let Ok(size) = env::var("BD_MAX_BODY_SIZE") {
            if let Ok(s) = size.parse() {
                self.max_body_size = s;
            }
        }
        if let Ok(budget) = env::var("BD_MUTATIONS_PER_MINUTE") {
            if let Ok(b) = budget.parse() {
                self.mutations_per_minute = b;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            bail!("Invalid port: port must be between 1 and 65535");
        }
        if self.host.is_empty() {
            bail!("Invalid host: host cannot be empty");
        }
        if self.request_timeout_secs == 0 {
            bail!("Invalid request_timeout_secs: must be greater than 0");
        }
        if self.max_body_size == 0 {
            bail!("Invalid max_body_size: must be greater than 0");
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
