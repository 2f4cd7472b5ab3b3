//! Per-request context.
//!
//! Replaces ambient "current user" state: the auth outcome, correlation
//! id and timing travel with the request through every engine call.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::model::{Role, User};

/// Context threaded from the HTTP surface into handlers.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// The authenticated caller, when a valid credential was presented.
    pub user: Option<User>,
    /// The session behind the credential, when one was presented.
    pub session_id: Option<String>,
    /// Correlation id included in error responses and logs.
    pub correlation_id: String,
    pub started_at: DateTime<Utc>,
}

impl RequestContext {
    pub fn new(user: Option<User>, session_id: Option<String>) -> Self {
        Self {
            user,
            session_id,
            correlation_id: Uuid::new_v4().to_string(),
            started_at: Utc::now(),
        }
    }

    pub fn anonymous() -> Self {
        Self::new(None, None)
    }

    /// The caller, or `Unauthenticated` for anonymous requests.
    pub fn require_user(&self) -> ApiResult<&User> {
        self.user.as_ref().ok_or(ApiError::Unauthenticated)
    }

    /// The caller, who must sit at or above `min` on the role ladder.
    pub fn require_role(&self, min: Role) -> ApiResult<&User> {
        let user = self.require_user()?;
        if user.role.at_least(min) {
            Ok(user)
        } else {
            Err(ApiError::Forbidden { required: min.to_string() })
        }
    }

    pub fn user_id(&self) -> Option<String> {
        self.user.as_ref().map(|u| u.id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> User {
        User {
            id: "u-1".to_string(),
            email: "rider@example.com".to_string(),
            name: "Rider".to_string(),
            password_hash: Some("hash".to_string()),
            external_identity: false,
            role,
            picture_url: None,
            created_at: Utc::now(),
            deleted: false,
        }
    }

    #[test]
    fn test_anonymous_requires() {
        let ctx = RequestContext::anonymous();
        assert_eq!(ctx.require_user().unwrap_err(), ApiError::Unauthenticated);
        assert_eq!(ctx.require_role(Role::User).unwrap_err(), ApiError::Unauthenticated);
    }

    #[test]
    fn test_role_gate() {
        let ctx = RequestContext::new(Some(user(Role::Moderator)), Some("s-1".to_string()));
        assert!(ctx.require_role(Role::Moderator).is_ok());
        assert!(matches!(
            ctx.require_role(Role::Admin).unwrap_err(),
            ApiError::Forbidden { .. }
        ));
    }

    #[test]
    fn test_correlation_ids_are_unique() {
        assert_ne!(
            RequestContext::anonymous().correlation_id,
            RequestContext::anonymous().correlation_id
        );
    }
}
