//! Credential verification, session issuance and role gating.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use super::password::PasswordService;
use super::token::TokenSigner;
use crate::config::AuthConfig;
use crate::error::{ApiError, ApiResult};
use crate::model::{Role, Session, SessionKind, User, UserView};
use crate::store::{Store, StoreError};

/// How a client presented its credential.
#[derive(Debug, Clone, Copy)]
pub enum Credential<'a> {
    Bearer(&'a str),
    SessionId(&'a str),
}

/// A verified external identity claim (the OAuth redirect dance happens
/// elsewhere; this service only sees its outcome).
#[derive(Debug, Clone)]
pub struct IdentityClaim {
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
}

/// Successful authentication outcome returned by register/login.
#[derive(Debug, Clone)]
pub struct AuthOutcome {
    pub user: UserView,
    pub token: String,
    pub session_id: String,
}

/// The identity engine.
pub struct AuthService {
    store: Arc<Store>,
    passwords: PasswordService,
    tokens: TokenSigner,
}

impl AuthService {
    pub fn new(store: Arc<Store>, config: &AuthConfig) -> ApiResult<Self> {
        Ok(Self {
            store,
            passwords: PasswordService::with_params(
                config.argon2_memory_kib,
                config.argon2_iterations,
            )?,
            tokens: TokenSigner::new(config.token_secret.clone(), config.token_lifetime_secs),
        })
    }

    /// Register a new password account and open a session.
    pub async fn register(&self, email: &str, password: &str, name: &str) -> ApiResult<AuthOutcome> {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(ApiError::validation("email", "must be a valid email address"));
        }
        if password.len() < 8 {
            return Err(ApiError::validation("password", "must be at least 8 characters"));
        }
        if name.trim().is_empty() {
            return Err(ApiError::validation("name", "must not be empty"));
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            name: name.trim().to_string(),
            password_hash: Some(self.passwords.hash(password)?),
            external_identity: false,
            role: Role::User,
            picture_url: None,
            created_at: Utc::now(),
            deleted: false,
        };

        match self.store.create_user(user.clone()).await {
            Ok(()) => {}
            Err(StoreError::Conflict { .. }) => {
                return Err(ApiError::conflict("user", email.to_lowercase()))
            }
            Err(e) => return Err(e.into()),
        }

        log::info!("Registered user {} ({})", user.id, user.email);
        self.open_session(&user, SessionKind::Bearer).await
    }

    /// Verify a password credential and open a session.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<AuthOutcome> {
        let user = self
            .store
            .user_by_email(email)
            .await
            .filter(|u| !u.deleted)
            .ok_or(ApiError::Unauthenticated)?;

        // External-identity accounts have no password and never will.
        let hash = user.password_hash.as_deref().ok_or(ApiError::Unauthenticated)?;
        if !self.passwords.verify(password, hash)? {
            return Err(ApiError::Unauthenticated);
        }

        self.open_session(&user, SessionKind::Bearer).await
    }

    /// Locate or create the account behind a verified identity claim and
    /// open a session.
    pub async fn external_login(&self, claim: IdentityClaim) -> ApiResult<AuthOutcome> {
        let email = claim.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(ApiError::validation("email", "must be a valid email address"));
        }

        let user = match self.store.user_by_email(email).await.filter(|u| !u.deleted) {
            Some(user) => user,
            None => {
                let user = User {
                    id: Uuid::new_v4().to_string(),
                    email: email.to_string(),
                    name: if claim.name.trim().is_empty() {
                        email.to_string()
                    } else {
                        claim.name.trim().to_string()
                    },
                    password_hash: None,
                    external_identity: true,
                    role: Role::User,
                    picture_url: claim.picture.clone(),
                    created_at: Utc::now(),
                    deleted: false,
                };
                match self.store.create_user(user.clone()).await {
                    Ok(()) => user,
                    // Concurrent first login for the same address: use the
                    // account the other request created.
                    Err(StoreError::Conflict { .. }) => self
                        .store
                        .user_by_email(email)
                        .await
                        .ok_or_else(|| ApiError::Internal("user vanished after conflict".into()))?,
                    Err(e) => return Err(e.into()),
                }
            }
        };

        self.open_session(&user, SessionKind::SessionId).await
    }

    /// Resolve a credential to its user.
    pub async fn authenticate(&self, credential: Credential<'_>) -> ApiResult<User> {
        self.resolve(credential).await.map(|(user, _)| user)
    }

    /// Resolve a credential to its user and the session behind it.
    pub async fn resolve(&self, credential: Credential<'_>) -> ApiResult<(User, String)> {
        let session_id = match credential {
            Credential::Bearer(token) => self.tokens.verify(token)?.session_id,
            Credential::SessionId(id) => id.to_string(),
        };

        let session =
            self.store.sessions.get(&session_id).await.ok_or(ApiError::Unauthenticated)?;
        if !session.is_active() {
            return Err(ApiError::Unauthenticated);
        }

        let user = self
            .store
            .users
            .get(&session.user_id)
            .await
            .filter(|u| !u.deleted)
            .ok_or(ApiError::Unauthenticated)?;
        Ok((user, session_id))
    }

    /// Revoke a session directly by id.
    pub async fn revoke_session(&self, session_id: &str) -> ApiResult<()> {
        self.store.sessions.update(session_id, |s| s.revoked = true).await?;
        Ok(())
    }

    /// Role gate. `Err(Forbidden)` when the user sits below `min` on the
    /// ladder.
    pub fn require_role(&self, user: &User, min: Role) -> ApiResult<()> {
        if user.role.at_least(min) {
            Ok(())
        } else {
            Err(ApiError::Forbidden { required: min.to_string() })
        }
    }

    /// Revoke the session behind a credential.
    pub async fn logout(&self, credential: Credential<'_>) -> ApiResult<()> {
        let (_, session_id) = self.resolve(credential).await?;
        self.revoke_session(&session_id).await
    }

    async fn open_session(&self, user: &User, kind: SessionKind) -> ApiResult<AuthOutcome> {
        let session = Session {
            id: Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            kind,
            issued_at: Utc::now(),
            expires_at: Utc::now() + chrono::Duration::seconds(self.tokens.lifetime_secs()),
            revoked: false,
        };
        let token = self.tokens.issue(&user.id, &session.id, user.role)?;
        let session_id = session.id.clone();
        self.store.sessions.insert(session.id.clone(), session).await?;

        Ok(AuthOutcome { user: user.public_view(), token, session_id })
    }

    /// Spawn the background sweep that drops expired sessions.
    pub fn spawn_session_sweeper(store: Arc<Store>, every: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let expired = store.sessions.scan_filter(|s| s.is_expired()).await;
                let count = expired.len();
                for session in expired {
                    store.sessions.remove(&session.id).await;
                }
                if count > 0 {
                    log::info!("Swept {count} expired sessions");
                }
            }
        })
    }
}
