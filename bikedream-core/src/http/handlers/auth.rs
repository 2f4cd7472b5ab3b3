//! Authentication endpoints.

use serde::{Deserialize, Serialize};

use crate::auth::{AuthOutcome, IdentityClaim};
use crate::error::{ApiError, ApiResult};
use crate::http::{respond, ApiRequest, ApiResponse, AppState};
use crate::model::UserView;

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RegisterRequest {
    email: String,
    password: String,
    name: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct LoginRequest {
    email: String,
    password: String,
}

/// External identity claim as delivered by the identity frontend. The
/// OAuth redirect flow happens upstream; by the time this endpoint is
/// called the claim has been verified.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ProfileRequest {
    email: String,
    name: String,
    #[serde(default)]
    picture: Option<String>,
    #[serde(default)]
    #[allow(dead_code)]
    session_token: Option<String>,
}

#[derive(Serialize)]
struct AuthBody {
    user: UserView,
    token: String,
    session_id: String,
}

impl From<AuthOutcome> for AuthBody {
    fn from(outcome: AuthOutcome) -> Self {
        Self { user: outcome.user, token: outcome.token, session_id: outcome.session_id }
    }
}

pub async fn register(state: &AppState, req: &ApiRequest) -> ApiResult<ApiResponse> {
    let input: RegisterRequest = req.json_body()?;
    let outcome = state.auth.register(&input.email, &input.password, &input.name).await?;
    Ok(respond::created(&AuthBody::from(outcome)))
}

pub async fn login(state: &AppState, req: &ApiRequest) -> ApiResult<ApiResponse> {
    let input: LoginRequest = req.json_body()?;
    let outcome = state.auth.login(&input.email, &input.password).await?;
    Ok(respond::ok(&AuthBody::from(outcome)))
}

pub async fn logout(state: &AppState, req: &ApiRequest) -> ApiResult<ApiResponse> {
    req.ctx.require_user()?;
    let session_id = req.ctx.session_id.as_deref().ok_or(ApiError::Unauthenticated)?;
    state.auth.revoke_session(session_id).await?;
    Ok(respond::no_content())
}

pub fn me(req: &ApiRequest) -> ApiResult<ApiResponse> {
    let user = req.ctx.require_user()?;
    Ok(respond::ok(&serde_json::json!({ "user": user.public_view() })))
}

/// Soft-delete the caller's account. The id is retained so existing
/// ratings and comments keep a valid author reference.
pub async fn delete_account(state: &AppState, req: &ApiRequest) -> ApiResult<ApiResponse> {
    let user = req.ctx.require_user()?;
    state.store.users.update(&user.id, |u| u.deleted = true).await?;
    if let Some(session_id) = req.ctx.session_id.as_deref() {
        state.auth.revoke_session(session_id).await?;
    }
    Ok(respond::no_content())
}

pub async fn external_profile(state: &AppState, req: &ApiRequest) -> ApiResult<ApiResponse> {
    let input: ProfileRequest = req.json_body()?;
    let outcome = state
        .auth
        .external_login(IdentityClaim {
            email: input.email,
            name: input.name,
            picture: input.picture,
        })
        .await?;
    Ok(respond::ok(&AuthBody::from(outcome)))
}
