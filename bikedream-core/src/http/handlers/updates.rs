//! Update-scheduler endpoints. Admin only.

use crate::error::{ApiError, ApiResult};
use crate::http::{respond, ApiRequest, ApiResponse, AppState};
use crate::model::Role;

pub async fn run_daily_update(state: &AppState, req: &ApiRequest) -> ApiResult<ApiResponse> {
    req.ctx.require_role(Role::Admin)?;
    let job = state.scheduler.trigger().await?;
    Ok(respond::ok(&serde_json::json!({
        "job_id": job.id,
        "status": job.status,
        "check_status_url": format!("/api/update-system/job-status/{}", job.id),
    })))
}

pub async fn job_status(state: &AppState, req: &ApiRequest, id: &str) -> ApiResult<ApiResponse> {
    req.ctx.require_role(Role::Admin)?;
    Ok(respond::ok(&state.scheduler.job(id).await?))
}

pub async fn update_history(state: &AppState, req: &ApiRequest) -> ApiResult<ApiResponse> {
    req.ctx.require_role(Role::Admin)?;
    let limit = match req.query_param("limit") {
        None => 20,
        Some(raw) => {
            let limit: i64 = raw
                .parse()
                .map_err(|_| ApiError::invalid("limit", format!("`{raw}` is not an integer")))?;
            if limit <= 0 {
                return Err(ApiError::invalid("limit", "must be at least 1"));
            }
            limit as usize
        }
    };
    let jobs = state.scheduler.history(limit).await;
    Ok(respond::ok(&serde_json::json!({ "jobs": jobs })))
}

pub async fn regional_customizations(
    state: &AppState,
    req: &ApiRequest,
) -> ApiResult<ApiResponse> {
    req.ctx.require_role(Role::Admin)?;
    let region = req.query_param("region").filter(|r| !r.trim().is_empty());
    let customizations = state.scheduler.regional_customizations(region).await;
    Ok(respond::ok(&serde_json::json!({ "customizations": customizations })))
}

pub async fn cancel(state: &AppState, req: &ApiRequest, id: &str) -> ApiResult<ApiResponse> {
    req.ctx.require_role(Role::Admin)?;
    let job = state.scheduler.cancel(id).await?;
    Ok(respond::ok(&serde_json::json!({ "job_id": job.id, "cancel_requested": true })))
}
