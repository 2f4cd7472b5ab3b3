//! Signed bearer tokens.
//!
//! Tokens are HMAC-SHA256 signed, base64url-encoded
//! `header.payload.signature` strings, opaque to clients. The payload
//! carries the user id, a role snapshot, the session id and the
//! issuance/expiry instants.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::{ApiError, ApiResult};
use crate::model::Role;

type HmacSha256 = Hmac<Sha256>;

const HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

/// Claims embedded in a token payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub user_id: String,
    pub session_id: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl TokenClaims {
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Issues and verifies signed tokens.
pub struct TokenSigner {
    secret: String,
    lifetime_secs: i64,
}

impl TokenSigner {
    pub fn new(secret: impl Into<String>, lifetime_secs: i64) -> Self {
        Self { secret: secret.into(), lifetime_secs }
    }

    pub fn lifetime_secs(&self) -> i64 {
        self.lifetime_secs
    }

    /// Issue a token for a user/session pair.
    pub fn issue(&self, user_id: &str, session_id: &str, role: Role) -> ApiResult<String> {
        let now = Utc::now().timestamp();
        let claims = TokenClaims {
            user_id: user_id.to_string(),
            session_id: session_id.to_string(),
            role,
            iat: now,
            exp: now + self.lifetime_secs,
        };

        let header_b64 = URL_SAFE_NO_PAD.encode(HEADER.as_bytes());
        let payload = serde_json::to_string(&claims)
            .map_err(|e| ApiError::Internal(format!("token payload: {e}")))?;
        let payload_b64 = URL_SAFE_NO_PAD.encode(payload.as_bytes());
        let signature = self.sign(&header_b64, &payload_b64);

        Ok(format!("{header_b64}.{payload_b64}.{signature}"))
    }

    /// Verify a token's signature and expiry and return its claims.
    pub fn verify(&self, token: &str) -> ApiResult<TokenClaims> {
        let mut parts = token.split('.');
        let (header_b64, payload_b64, signature_b64) =
            match (parts.next(), parts.next(), parts.next(), parts.next()) {
                (Some(h), Some(p), Some(s), None) => (h, p, s),
                _ => return Err(ApiError::Unauthenticated),
            };

        // Constant-time signature check via the MAC itself.
        let signature =
            URL_SAFE_NO_PAD.decode(signature_b64).map_err(|_| ApiError::Unauthenticated)?;
        let mut mac = self.mac();
        mac.update(format!("{header_b64}.{payload_b64}").as_bytes());
        mac.verify_slice(&signature).map_err(|_| ApiError::Unauthenticated)?;

        let payload =
            URL_SAFE_NO_PAD.decode(payload_b64).map_err(|_| ApiError::Unauthenticated)?;
        let claims: TokenClaims =
            serde_json::from_slice(&payload).map_err(|_| ApiError::Unauthenticated)?;

        if claims.is_expired() {
            return Err(ApiError::Unauthenticated);
        }
        Ok(claims)
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(self.secret.as_bytes()).expect("HMAC accepts any key length")
    }

    fn sign(&self, header_b64: &str, payload_b64: &str) -> String {
        let mut mac = self.mac();
        mac.update(format!("{header_b64}.{payload_b64}").as_bytes());
        URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
    }
}
