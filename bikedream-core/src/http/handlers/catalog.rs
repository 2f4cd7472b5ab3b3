//! Catalog read endpoints and the moderator seed operation.

use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::http::{respond, ApiRequest, ApiResponse, AppState};
use crate::model::{region, EventKind, Role};
use crate::query::{MotorcycleFilter, PageRequest, SortKey, SortOrder};
use crate::seed;

const DEFAULT_SUGGESTIONS: usize = 10;
const MAX_SUGGESTIONS: usize = 25;

pub async fn list(state: &AppState, req: &ApiRequest) -> ApiResult<ApiResponse> {
    let filter = MotorcycleFilter::from_query(&req.query)?;
    let sort_key = SortKey::parse(req.query_param("sort_by").unwrap_or_default())?;
    let order = SortOrder::parse(req.query_param("sort_order").unwrap_or_default())?;
    let page = PageRequest::from_query(&req.query)?;

    let (motorcycles, pagination) = state.catalog.list(&filter, sort_key, order, &page).await;

    if let Some(search) = &filter.search {
        state.analytics.record(
            EventKind::Search,
            req.ctx.user_id(),
            serde_json::json!({ "q": search, "hits": pagination.total_count }),
        );
    }
    Ok(respond::ok(&serde_json::json!({
        "motorcycles": motorcycles,
        "pagination": pagination,
    })))
}

pub async fn get(state: &AppState, req: &ApiRequest, id: &str) -> ApiResult<ApiResponse> {
    let region = validated_region(req)?;
    let motorcycle = state.catalog.get(id, region.as_deref()).await?;

    state.analytics.record(
        EventKind::MotorcycleClick,
        req.ctx.user_id(),
        serde_json::json!({ "motorcycle_id": id }),
    );
    Ok(respond::ok(&motorcycle))
}

pub async fn categories_summary(state: &AppState, req: &ApiRequest) -> ApiResult<ApiResponse> {
    let region = validated_region(req)?;
    let hide_unavailable = match req.query_param("hide_unavailable") {
        None => false,
        Some(raw) => raw
            .parse::<bool>()
            .map_err(|_| ApiError::invalid("hide_unavailable", "must be true or false"))?,
    };
    let summaries = state.catalog.summary(region.as_deref(), hide_unavailable).await;
    Ok(respond::ok(&summaries))
}

pub async fn filter_options(state: &AppState) -> ApiResult<ApiResponse> {
    Ok(respond::ok(&state.catalog.filter_options().await))
}

pub async fn features(state: &AppState) -> ApiResult<ApiResponse> {
    let features = state.catalog.features().await;
    Ok(respond::ok(&serde_json::json!({ "features": features })))
}

pub async fn suggestions(state: &AppState, req: &ApiRequest) -> ApiResult<ApiResponse> {
    let q = req.query_param("q").unwrap_or_default();
    let limit = match req.query_param("limit") {
        None => DEFAULT_SUGGESTIONS,
        Some(raw) => {
            let limit: i64 = raw
                .parse()
                .map_err(|_| ApiError::invalid("limit", format!("`{raw}` is not an integer")))?;
            if limit <= 0 {
                return Err(ApiError::invalid("limit", "must be at least 1"));
            }
            (limit as usize).min(MAX_SUGGESTIONS)
        }
    };
    let suggestions = state.catalog.suggest(q, limit);
    Ok(respond::ok(&serde_json::json!({ "suggestions": suggestions })))
}

pub async fn compare(state: &AppState, req: &ApiRequest) -> ApiResult<ApiResponse> {
    let ids: Vec<String> = req.json_body()?;
    let motorcycles = state.catalog.compare(&ids).await?;
    Ok(respond::ok(&serde_json::json!({ "motorcycles": motorcycles })))
}

pub async fn pricing(state: &AppState, req: &ApiRequest, id: &str) -> ApiResult<ApiResponse> {
    let region = validated_region(req)?.unwrap_or_else(|| "US".to_string());
    let quotes = state.catalog.pricing(id, &region).await?;
    Ok(respond::ok(&serde_json::json!({ "region": region, "vendors": quotes })))
}

/// Optional body for the seed endpoint; absent means "install the
/// built-in roster".
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct SeedRequest {
    #[serde(default)]
    replace: bool,
}

pub async fn seed(state: &AppState, req: &ApiRequest) -> ApiResult<ApiResponse> {
    req.ctx.require_role(Role::Moderator)?;
    let replace = if req.body.is_empty() {
        false
    } else {
        req.json_body::<SeedRequest>()?.replace
    };

    if replace {
        state.store.motorcycles.clear().await;
    }
    let inserted = seed::apply(&state.store).await;
    state.catalog.rebuild_suggestions().await;

    Ok(respond::created(&serde_json::json!({
        "seeded": inserted,
        "total": state.store.motorcycles.len(),
    })))
}

fn validated_region(req: &ApiRequest) -> ApiResult<Option<String>> {
    match req.query_param("region") {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => region::normalize(raw)
            .map(Some)
            .ok_or_else(|| ApiError::invalid("region", format!("unknown region code `{raw}`"))),
    }
}
