//! Garage, group, achievement, request and analytics endpoints.

use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::http::{respond, ApiRequest, ApiResponse, AppState};
use crate::interact::{GarageItemInput, GroupInput, RequestInput, RequestResponseInput};
use crate::model::{EventKind, RequestStatus, Role};

// --- Garage -------------------------------------------------------------

pub async fn list_garage(state: &AppState, req: &ApiRequest) -> ApiResult<ApiResponse> {
    let user = req.ctx.require_user()?;
    let items = state.garage.list_for(&user.id).await;
    Ok(respond::ok(&serde_json::json!({ "items": items })))
}

pub async fn add_garage_item(state: &AppState, req: &ApiRequest) -> ApiResult<ApiResponse> {
    let user = req.ctx.require_user()?;
    let input: GarageItemInput = req.json_body()?;
    let item = state.garage.add(&user.id, input).await?;
    Ok(respond::created(&item))
}

pub async fn update_garage_item(
    state: &AppState,
    req: &ApiRequest,
    id: &str,
) -> ApiResult<ApiResponse> {
    let user = req.ctx.require_user()?;
    let input: GarageItemInput = req.json_body()?;
    let item = state.garage.update(&user.id, id, input).await?;
    Ok(respond::ok(&item))
}

pub async fn remove_garage_item(
    state: &AppState,
    req: &ApiRequest,
    id: &str,
) -> ApiResult<ApiResponse> {
    let user = req.ctx.require_user()?;
    state.garage.remove(&user.id, id).await?;
    Ok(respond::no_content())
}

// --- Groups -------------------------------------------------------------

pub async fn list_groups(state: &AppState, req: &ApiRequest) -> ApiResult<ApiResponse> {
    let groups = state.groups.list(req.ctx.user_id().as_deref()).await;
    Ok(respond::ok(&serde_json::json!({ "groups": groups })))
}

pub async fn create_group(state: &AppState, req: &ApiRequest) -> ApiResult<ApiResponse> {
    let user = req.ctx.require_user()?;
    let input: GroupInput = req.json_body()?;
    let group = state.groups.create(&user.id, input).await?;
    Ok(respond::created(&group))
}

pub async fn get_group(state: &AppState, id: &str) -> ApiResult<ApiResponse> {
    Ok(respond::ok(&state.groups.get(id).await?))
}

pub async fn join_group(state: &AppState, req: &ApiRequest, id: &str) -> ApiResult<ApiResponse> {
    let user = req.ctx.require_user()?;
    let joined = state.groups.join(&user.id, id).await?;
    state.analytics.record(
        EventKind::Action,
        Some(user.id.clone()),
        serde_json::json!({ "action": "join_group", "group_id": id }),
    );
    Ok(respond::ok(&serde_json::json!({ "joined": joined })))
}

pub async fn leave_group(state: &AppState, req: &ApiRequest, id: &str) -> ApiResult<ApiResponse> {
    let user = req.ctx.require_user()?;
    state.groups.leave(&user.id, id).await?;
    Ok(respond::no_content())
}

// --- Achievements -------------------------------------------------------

pub async fn list_achievements(state: &AppState) -> ApiResult<ApiResponse> {
    let achievements = state.achievements.catalog().await;
    Ok(respond::ok(&serde_json::json!({ "achievements": achievements })))
}

pub async fn my_achievements(state: &AppState, req: &ApiRequest) -> ApiResult<ApiResponse> {
    let user = req.ctx.require_user()?;
    let achievements = state.achievements.list_for_user(&user.id).await;
    Ok(respond::ok(&serde_json::json!({ "achievements": achievements })))
}

// --- User requests ------------------------------------------------------

pub async fn list_my_requests(state: &AppState, req: &ApiRequest) -> ApiResult<ApiResponse> {
    let user = req.ctx.require_user()?;
    let requests = state.requests.list_for(&user.id).await;
    Ok(respond::ok(&serde_json::json!({ "requests": requests })))
}

pub async fn create_request(state: &AppState, req: &ApiRequest) -> ApiResult<ApiResponse> {
    let user = req.ctx.require_user()?;
    let input: RequestInput = req.json_body()?;
    let request = state.requests.create(&user.id, input).await?;
    Ok(respond::created(&request))
}

pub async fn admin_list_requests(state: &AppState, req: &ApiRequest) -> ApiResult<ApiResponse> {
    req.ctx.require_role(Role::Admin)?;
    let status = match req.query_param("status") {
        None => None,
        Some(raw) => Some(parse_status(raw)?),
    };
    let requests = state.requests.list_all(status).await;
    Ok(respond::ok(&serde_json::json!({ "requests": requests })))
}

pub async fn admin_respond_request(
    state: &AppState,
    req: &ApiRequest,
    id: &str,
) -> ApiResult<ApiResponse> {
    req.ctx.require_role(Role::Admin)?;
    let input: RequestResponseInput = req.json_body()?;
    let request = state.requests.respond(id, input).await?;
    Ok(respond::ok(&request))
}

fn parse_status(raw: &str) -> ApiResult<RequestStatus> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "pending" => Ok(RequestStatus::Pending),
        "inprogress" | "in_progress" => Ok(RequestStatus::InProgress),
        "resolved" => Ok(RequestStatus::Resolved),
        "rejected" => Ok(RequestStatus::Rejected),
        other => Err(ApiError::invalid("status", format!("unknown status `{other}`"))),
    }
}

// --- Analytics ----------------------------------------------------------

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct AnalyticsRequest {
    kind: EventKind,
    #[serde(default)]
    payload: serde_json::Value,
}

pub async fn record_analytics(state: &AppState, req: &ApiRequest) -> ApiResult<ApiResponse> {
    let input: AnalyticsRequest = req.json_body()?;
    state.analytics.record(input.kind, req.ctx.user_id(), input.payload);
    Ok(respond::json(http::StatusCode::ACCEPTED, &serde_json::json!({ "queued": true })))
}
