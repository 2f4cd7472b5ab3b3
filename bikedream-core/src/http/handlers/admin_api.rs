//! Banner and user administration plus aggregate stats.

use crate::admin::BannerInput;
use crate::error::{ApiError, ApiResult};
use crate::http::{respond, ApiRequest, ApiResponse, AppState};
use crate::model::Role;

/// Public: currently live banners only.
pub async fn live_banners(state: &AppState) -> ApiResult<ApiResponse> {
    let banners = state.banners.live().await;
    Ok(respond::ok(&serde_json::json!({ "banners": banners })))
}

pub async fn list_banners(state: &AppState, req: &ApiRequest) -> ApiResult<ApiResponse> {
    req.ctx.require_role(Role::Moderator)?;
    let banners = state.banners.list_all().await;
    Ok(respond::ok(&serde_json::json!({ "banners": banners })))
}

pub async fn create_banner(state: &AppState, req: &ApiRequest) -> ApiResult<ApiResponse> {
    req.ctx.require_role(Role::Moderator)?;
    let input: BannerInput = req.json_body()?;
    let banner = state.banners.create(input).await?;
    Ok(respond::created(&banner))
}

pub async fn update_banner(state: &AppState, req: &ApiRequest, id: &str) -> ApiResult<ApiResponse> {
    req.ctx.require_role(Role::Moderator)?;
    let input: BannerInput = req.json_body()?;
    let banner = state.banners.update(id, input).await?;
    Ok(respond::ok(&banner))
}

pub async fn delete_banner(state: &AppState, req: &ApiRequest, id: &str) -> ApiResult<ApiResponse> {
    req.ctx.require_role(Role::Moderator)?;
    state.banners.delete(id).await?;
    Ok(respond::no_content())
}

pub async fn stats(state: &AppState, req: &ApiRequest) -> ApiResult<ApiResponse> {
    req.ctx.require_role(Role::Admin)?;
    Ok(respond::ok(&state.stats.snapshot().await))
}

pub async fn list_users(state: &AppState, req: &ApiRequest) -> ApiResult<ApiResponse> {
    req.ctx.require_role(Role::Admin)?;
    let users = state.user_admin.list().await;
    Ok(respond::ok(&serde_json::json!({ "users": users })))
}

pub async fn set_role(state: &AppState, req: &ApiRequest, id: &str) -> ApiResult<ApiResponse> {
    req.ctx.require_role(Role::Admin)?;
    let new_role = req
        .query_param("new_role")
        .ok_or_else(|| ApiError::invalid("new_role", "query parameter is required"))?;
    let new_role = Role::parse(new_role)
        .ok_or_else(|| ApiError::invalid("new_role", format!("unknown role `{new_role}`")))?;
    let user = state.user_admin.set_role(id, new_role).await?;
    Ok(respond::ok(&user))
}
