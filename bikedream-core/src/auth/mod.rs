//! Identity: password credentials, signed tokens, sessions and role
//! gating.

pub mod password;
pub mod service;
pub mod token;

pub use password::PasswordService;
pub use service::{AuthOutcome, AuthService, Credential, IdentityClaim};
pub use token::{TokenClaims, TokenSigner};
