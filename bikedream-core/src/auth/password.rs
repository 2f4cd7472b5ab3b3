//! Password hashing.
//!
//! Uses Argon2id with a per-user random salt. The work factor is
//! configurable so tests can run with a cheap profile while production
//! keeps the OWASP-recommended parameters.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::error::{ApiError, ApiResult};

/// Argon2id password hasher.
pub struct PasswordService {
    argon2: Argon2<'static>,
}

impl Default for PasswordService {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordService {
    /// Hasher with the library default parameters (Argon2id, 19 MiB,
    /// 2 iterations).
    pub fn new() -> Self {
        Self { argon2: Argon2::default() }
    }

    /// Hasher with an explicit work factor.
    pub fn with_params(memory_kib: u32, iterations: u32) -> ApiResult<Self> {
        let params = Params::new(memory_kib, iterations, 1, None)
            .map_err(|e| ApiError::Internal(format!("argon2 params: {e}")))?;
        Ok(Self { argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params) })
    }

    /// Hash a password. Returns the PHC string form, which embeds the
    /// algorithm, parameters and salt.
    pub fn hash(&self, password: &str) -> ApiResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))?;
        Ok(hash.to_string())
    }

    /// Verify a password against a stored PHC hash. Constant-time under
    /// the hood.
    pub fn verify(&self, password: &str, hash: &str) -> ApiResult<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| ApiError::Internal(format!("invalid password hash: {e}")))?;
        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(ApiError::Internal(format!("password verification failed: {e}"))),
        }
    }
}
