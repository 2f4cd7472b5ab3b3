//! Authentication configuration.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Key used to sign bearer tokens (HMAC-SHA256).
    /// Env: BD_TOKEN_SECRET
    pub token_secret: String,

    /// Token and session lifetime in seconds.
    /// Env: BD_TOKEN_LIFETIME
    pub token_lifetime_secs: i64,

    /// Argon2 memory cost in KiB.
    /// Env: BD_ARGON2_MEMORY_KIB
    pub argon2_memory_kib: u32,

    /// Argon2 iteration count.
    /// Env: BD_ARGON2_ITERATIONS
    pub argon2_iterations: u32,

    /// Interval between expired-session sweeps, in seconds.
    /// Env: BD_SESSION_SWEEP_INTERVAL
    pub session_sweep_interval_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: "change-me-in-production".to_string(),
            token_lifetime_secs: 7 * 24 * 60 * 60, // 7 days
            argon2_memory_kib: 19 * 1024,          // OWASP recommended
            argon2_iterations: 2,
            session_sweep_interval_secs: 300,
        }
    }
}

impl AuthConfig {
    pub fn apply_env_vars(&mut self) {
        if let Ok(secret) = env::var("BD_TOKEN_SECRET") {
            self.token_secret = secret;
        }
        if let Ok(lifetime) = env::var("BD_TOKEN_LIFETIME") {
            if let Ok(l) = lifetime.parse() {
                self.token_lifetime_secs = l;
            }
        }
        if let Ok(mem) = env::var("BD_ARGON2_MEMORY_KIB") {
            if let Ok(m) = mem.parse() {
                self.argon2_memory_kib = m;
            }
        }
        if let Ok(iters) = env::var("BD_ARGON2_ITERATIONS") {
            if let Ok(i) = iters.parse() {
                self.argon2_iterations = i;
            }
        }
        if let Ok(sweep) = env::var("BD_SESSION_SWEEP_INTERVAL") {
            if let Ok(s) = sweep.parse() {
                self.session_sweep_interval_secs = s;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.token_secret.is_empty() {
            bail!("Invalid token_secret: cannot be empty");
        }
        if self.token_lifetime_secs <= 0 {
            bail!("Invalid token_lifetime_secs: must be positive");
        }
        if self.argon2_memory_kib < 8 {
            bail!("Invalid argon2_memory_kib: must be at least 8 KiB");
        }
        if self.argon2_iterations == 0 {
            bail!("Invalid argon2_iterations: must be at least 1");
        }
        Ok(())
    }
}
