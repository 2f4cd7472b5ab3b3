//! Favorites, ratings and comment endpoints. All mutations require auth.

use serde::Deserialize;

use crate::error::ApiResult;
use crate::http::{respond, ApiRequest, ApiResponse, AppState};
use crate::model::EventKind;

pub async fn favorite(state: &AppState, req: &ApiRequest, id: &str) -> ApiResult<ApiResponse> {
    let user = req.ctx.require_user()?;
    let created = state.favorites.favorite(&user.id, id).await?;
    state.analytics.record(
        EventKind::Action,
        Some(user.id.clone()),
        serde_json::json!({ "action": "favorite", "motorcycle_id": id }),
    );
    Ok(respond::ok(&serde_json::json!({ "favorited": true, "created": created })))
}

pub async fn unfavorite(state: &AppState, req: &ApiRequest, id: &str) -> ApiResult<ApiResponse> {
    let user = req.ctx.require_user()?;
    state.favorites.unfavorite(&user.id, id).await?;
    Ok(respond::no_content())
}

pub async fn list_favorites(state: &AppState, req: &ApiRequest) -> ApiResult<ApiResponse> {
    let user = req.ctx.require_user()?;
    let motorcycles = state.favorites.list_for(&user.id).await;
    Ok(respond::ok(&serde_json::json!({ "motorcycles": motorcycles })))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RateRequest {
    rating: u8,
    #[serde(default)]
    review_text: Option<String>,
}

pub async fn rate(state: &AppState, req: &ApiRequest, id: &str) -> ApiResult<ApiResponse> {
    let user = req.ctx.require_user()?;
    let input: RateRequest = req.json_body()?;
    let rating = state.ratings.rate(&user.id, id, input.rating, input.review_text).await?;
    Ok(respond::created(&rating))
}

pub async fn ratings(state: &AppState, id: &str) -> ApiResult<ApiResponse> {
    let ratings = state.ratings.get_ratings(id).await?;
    Ok(respond::ok(&serde_json::json!({ "ratings": ratings })))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CommentRequest {
    content: String,
    #[serde(default)]
    parent_comment_id: Option<String>,
}

pub async fn comment(state: &AppState, req: &ApiRequest, id: &str) -> ApiResult<ApiResponse> {
    let user = req.ctx.require_user()?;
    let input: CommentRequest = req.json_body()?;
    let comment =
        state.comments.comment(&user.id, id, &input.content, input.parent_comment_id).await?;
    Ok(respond::created(&comment))
}

pub async fn comments(state: &AppState, req: &ApiRequest, id: &str) -> ApiResult<ApiResponse> {
    let include_replies =
        req.query_param("include_replies").map_or(true, |raw| raw != "false");
    let mut threads = state.comments.get_comments(id, req.ctx.user_id().as_deref()).await?;
    if !include_replies {
        for thread in &mut threads {
            thread.replies.clear();
        }
    }
    Ok(respond::ok(&serde_json::json!({ "comments": threads })))
}

pub async fn like_comment(state: &AppState, req: &ApiRequest, id: &str) -> ApiResult<ApiResponse> {
    let user = req.ctx.require_user()?;
    let liked = state.comments.like(&user.id, id).await?;
    Ok(respond::ok(&serde_json::json!({ "liked": liked })))
}

pub async fn flag_comment(state: &AppState, req: &ApiRequest, id: &str) -> ApiResult<ApiResponse> {
    let user = req.ctx.require_user()?;
    let flags = state.comments.flag(&user.id, id).await?;
    Ok(respond::ok(&serde_json::json!({ "flagged": true, "flag_count": flags })))
}

pub async fn delete_comment(
    state: &AppState,
    req: &ApiRequest,
    id: &str,
) -> ApiResult<ApiResponse> {
    let user = req.ctx.require_user()?;
    state.comments.delete(user, id).await?;
    Ok(respond::no_content())
}
