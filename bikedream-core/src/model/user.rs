//! Users, roles and sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role ladder: `User < Moderator < Admin`. The derive order of the
/// variants is what makes the `Ord` comparison follow the ladder.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Role {
    User,
    Moderator,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Moderator => "Moderator",
            Role::Admin => "Admin",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Some(Role::User),
            "moderator" => Some(Role::Moderator),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    /// True when this role is at least `min` on the ladder.
    pub fn at_least(&self, min: Role) -> bool {
        *self >= min
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A registered account.
///
/// Exactly one of `password_hash` / `external_identity` is set: password
/// accounts carry an Argon2id hash, external-identity accounts carry none
/// and cannot later set one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    /// Stored as entered; uniqueness is enforced case-insensitively.
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    #[serde(default)]
    pub external_identity: bool,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture_url: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Soft delete; the id is retained for foreign-key integrity.
    #[serde(default)]
    pub deleted: bool,
}

impl User {
    /// The view of a user that is safe to put on the wire.
    pub fn public_view(&self) -> UserView {
        UserView {
            id: self.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role,
            picture_url: self.picture_url.clone(),
            created_at: self.created_at,
        }
    }
}

/// Wire-safe user representation (no credential material).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserView {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// How a session credential is presented by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionKind {
    Bearer,
    SessionId,
}

/// An authenticated session. Destroyed on logout, swept after expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub kind: SessionKind,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub revoked: bool,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// A session authenticates requests only while unexpired and unrevoked.
    pub fn is_active(&self) -> bool {
        !self.revoked && !self.is_expired()
    }
}
