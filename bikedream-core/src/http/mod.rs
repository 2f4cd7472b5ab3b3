//! HTTP surface.
//!
//! A thin translator over the engines: it decodes requests, resolves the
//! caller's credential into a [`RequestContext`], dispatches to the
//! appropriate engine and maps typed errors onto status codes. No
//! business logic lives here beyond input validation.

pub mod context;
pub mod handlers;
pub mod ratelimit;
pub mod respond;
pub mod router;

pub use context::RequestContext;
pub use ratelimit::RateLimiter;
pub use respond::ApiResponse;
pub use router::{match_path, PathParams};

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::Method;
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::TokioIo;
use serde::de::DeserializeOwned;
use tokio::net::TcpListener;

use crate::admin::{BannerService, StatsService, UserAdminService};
use crate::auth::{AuthService, Credential};
use crate::config::BikeDreamConfig;
use crate::error::{ApiError, ApiResult};
use crate::interact::{
    AchievementService, AnalyticsSink, CommentService, FavoriteService, GarageService,
    GroupService, RatingService, RequestService,
};
use crate::query::{CatalogQuery, QueryParams, SuggestionIndex};
use crate::scheduler::UpdateScheduler;
use crate::store::Store;

/// Everything a handler can reach, built once at startup and shared.
pub struct AppState {
    pub config: BikeDreamConfig,
    pub store: Arc<Store>,
    pub auth: AuthService,
    pub catalog: CatalogQuery,
    pub suggestions: Arc<SuggestionIndex>,
    pub favorites: FavoriteService,
    pub ratings: RatingService,
    pub comments: CommentService,
    pub achievements: Arc<AchievementService>,
    pub garage: GarageService,
    pub groups: GroupService,
    pub requests: RequestService,
    pub banners: BannerService,
    pub stats: StatsService,
    pub user_admin: UserAdminService,
    pub scheduler: Arc<UpdateScheduler>,
    pub analytics: AnalyticsSink,
    pub limiter: RateLimiter,
}

impl AppState {
    /// Build the full engine stack over a fresh store. Must be called
    /// within a tokio runtime (background tasks are spawned here).
    pub async fn new(config: BikeDreamConfig) -> ApiResult<Arc<Self>> {
        Self::with_store(Store::new(), config).await
    }

    /// Build the engine stack over an existing (possibly snapshot-loaded)
    /// store.
    pub async fn with_store(store: Arc<Store>, config: BikeDreamConfig) -> ApiResult<Arc<Self>> {
        let suggestions = Arc::new(SuggestionIndex::new());
        let achievements = Arc::new(AchievementService::new(store.clone()));
        achievements.install_defaults().await;

        let catalog = CatalogQuery::new(store.clone(), suggestions.clone());
        catalog.rebuild_suggestions().await;

        let state = Arc::new(Self {
            auth: AuthService::new(store.clone(), &config.auth)?,
            catalog,
            favorites: FavoriteService::new(store.clone(), achievements.clone()),
            ratings: RatingService::new(store.clone(), achievements.clone()),
            comments: CommentService::new(store.clone(), achievements.clone()),
            garage: GarageService::new(store.clone(), achievements.clone()),
            groups: GroupService::new(store.clone(), achievements.clone()),
            requests: RequestService::new(store.clone()),
            banners: BannerService::new(store.clone()),
            stats: StatsService::new(store.clone()),
            user_admin: UserAdminService::new(store.clone()),
            scheduler: UpdateScheduler::new(
                store.clone(),
                suggestions.clone(),
                config.scheduler.clone(),
            ),
            analytics: AnalyticsSink::spawn(store.clone()),
            limiter: RateLimiter::per_minute(config.server.mutations_per_minute),
            achievements,
            suggestions,
            store,
            config,
        });
        Ok(state)
    }
}

/// A fully decoded request, ready for dispatch.
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: QueryParams,
    pub body: Bytes,
    pub ctx: RequestContext,
}

impl ApiRequest {
    /// Decode the JSON body into an input DTO. Unknown fields are
    /// rejected by the DTOs themselves (`deny_unknown_fields`).
    pub fn json_body<T: DeserializeOwned>(&self) -> ApiResult<T> {
        if self.body.is_empty() {
            return Err(ApiError::invalid("body", "expected a JSON body"));
        }
        serde_json::from_slice(&self.body)
            .map_err(|e| ApiError::invalid("body", e.to_string()))
    }

    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }
}

/// Parse and percent-decode a raw query string.
pub fn parse_query(raw: Option<&str>) -> QueryParams {
    let mut params = HashMap::new();
    let Some(raw) = raw else { return params };
    for pair in raw.split('&') {
        if pair.is_empty() {
            continue;
        }
        let mut kv = pair.splitn(2, '=');
        let key = decode_component(kv.next().unwrap_or_default());
        let value = decode_component(kv.next().unwrap_or_default());
        if !key.is_empty() {
            params.insert(key, value);
        }
    }
    params
}

fn decode_component(s: &str) -> String {
    let plus_decoded = s.replace('+', " ");
    urlencoding::decode(&plus_decoded)
        .map(|cow| cow.into_owned())
        .unwrap_or(plus_decoded)
}

/// The HTTP server.
pub struct HttpServer {
    state: Arc<AppState>,
}

impl HttpServer {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Bind and serve until the process exits.
    pub async fn serve(&self) -> anyhow::Result<()> {
        let addr = self.state.config.server.listen_addr();
        let listener = TcpListener::bind(&addr).await?;
        log::info!("HTTP server listening on {addr}");

        loop {
            let (stream, peer) = listener.accept().await?;
            let state = self.state.clone();
            tokio::spawn(async move {
                let io = TokioIo::new(stream);
                let service = service_fn(move |req| {
                    let state = state.clone();
                    async move {
                        Ok::<_, std::convert::Infallible>(handle_request(state, req).await)
                    }
                });
                if let Err(e) =
                    hyper::server::conn::http1::Builder::new().serve_connection(io, service).await
                {
                    log::debug!("Connection from {peer} ended: {e}");
                }
            });
        }
    }
}

/// Decode, authenticate, dispatch and encode one request.
pub async fn handle_request(state: Arc<AppState>, req: Request<Incoming>) -> ApiResponse {
    let (parts, body) = req.into_parts();
    let query = parse_query(parts.uri.query());
    let path = parts.uri.path().to_string();

    // Body first: the cap applies before anything else touches the bytes.
    let body = match read_body(body, state.config.server.max_body_size).await {
        Ok(body) => body,
        Err(e) => return respond::error(&e, &uuid::Uuid::new_v4().to_string()),
    };

    // Resolve the credential, if any. A presented-but-invalid credential
    // is a hard 401 even on anonymous-friendly endpoints.
    let credential = bearer_token(&parts.headers)
        .map(Credential::Bearer)
        .or_else(|| session_header(&parts.headers).map(Credential::SessionId));
    let (user, session_id) = match credential {
        None => (None, None),
        Some(credential) => match state.auth.resolve(credential).await {
            Ok((user, session_id)) => (Some(user), Some(session_id)),
            Err(e) => return respond::error(&e, &uuid::Uuid::new_v4().to_string()),
        },
    };
    let ctx = RequestContext::new(user, session_id);
    let correlation_id = ctx.correlation_id.clone();

    // Per-user mutation budget.
    if parts.method != Method::GET {
        if let Some(user_id) = ctx.user_id() {
            if let Err(e) = state.limiter.check(&user_id).await {
                return respond::error(&e, &correlation_id);
            }
        }
    }

    let request = ApiRequest { method: parts.method, path, query, body, ctx };
    let deadline = Duration::from_secs(state.config.server.request_timeout_secs);
    let outcome = tokio::time::timeout(deadline, dispatch(&state, &request)).await;

    match outcome {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => respond::error(&e, &correlation_id),
        Err(_) => {
            log::error!("[{correlation_id}] request deadline exceeded");
            respond::error(
                &ApiError::Internal("request deadline exceeded".to_string()),
                &correlation_id,
            )
        }
    }
}

async fn read_body(body: Incoming, cap: usize) -> ApiResult<Bytes> {
    let collected = body
        .collect()
        .await
        .map_err(|e| ApiError::invalid("body", format!("failed to read body: {e}")))?
        .to_bytes();
    if collected.len() > cap {
        return Err(ApiError::invalid("body", format!("body exceeds {cap} bytes")));
    }
    Ok(collected)
}

fn bearer_token(headers: &http::HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn session_header(headers: &http::HeaderMap) -> Option<&str> {
    headers
        .get("x-session-id")
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Route table. Literal segments are tried before `:param` patterns so
/// `/motorcycles/favorites` never shadows into `/motorcycles/:id`.
pub async fn dispatch(state: &AppState, req: &ApiRequest) -> ApiResult<ApiResponse> {
    use crate::http::handlers::{admin_api, auth, catalog, community, interact, updates};

    let path = req.path.as_str();
    let method = &req.method;

    if method == Method::GET && path == "/api/health" {
        return Ok(respond::ok(&serde_json::json!({ "status": "ok" })));
    }

    // --- Auth -----------------------------------------------------------
    if path == "/api/auth/register" && method == Method::POST {
        return auth::register(state, req).await;
    }
    if path == "/api/auth/login" && method == Method::POST {
        return auth::login(state, req).await;
    }
    if path == "/api/auth/logout" && method == Method::POST {
        return auth::logout(state, req).await;
    }
    if path == "/api/auth/me" && method == Method::GET {
        return auth::me(req);
    }
    if path == "/api/auth/me" && method == Method::DELETE {
        return auth::delete_account(state, req).await;
    }
    if path == "/api/auth/profile" && method == Method::POST {
        return auth::external_profile(state, req).await;
    }

    // --- Catalog (literal paths before :id) -----------------------------
    if path == "/api/motorcycles" && method == Method::GET {
        return catalog::list(state, req).await;
    }
    if path == "/api/motorcycles/favorites" && method == Method::GET {
        return interact::list_favorites(state, req).await;
    }
    if path == "/api/motorcycles/categories/summary" && method == Method::GET {
        return catalog::categories_summary(state, req).await;
    }
    if path == "/api/motorcycles/filters/options" && method == Method::GET {
        return catalog::filter_options(state).await;
    }
    if path == "/api/motorcycles/filters/features" && method == Method::GET {
        return catalog::features(state).await;
    }
    if path == "/api/motorcycles/search/suggestions" && method == Method::GET {
        return catalog::suggestions(state, req).await;
    }
    if path == "/api/motorcycles/compare" && method == Method::POST {
        return catalog::compare(state, req).await;
    }
    if path == "/api/motorcycles/seed" && method == Method::POST {
        return catalog::seed(state, req).await;
    }
    if let Some(p) = match_path("/api/motorcycles/:id/pricing", path) {
        if method == Method::GET {
            return catalog::pricing(state, req, &p["id"]).await;
        }
    }
    if let Some(p) = match_path("/api/motorcycles/:id/favorite", path) {
        if method == Method::POST {
            return interact::favorite(state, req, &p["id"]).await;
        }
        if method == Method::DELETE {
            return interact::unfavorite(state, req, &p["id"]).await;
        }
    }
    if let Some(p) = match_path("/api/motorcycles/:id/rate", path) {
        if method == Method::POST {
            return interact::rate(state, req, &p["id"]).await;
        }
    }
    if let Some(p) = match_path("/api/motorcycles/:id/ratings", path) {
        if method == Method::GET {
            return interact::ratings(state, &p["id"]).await;
        }
    }
    if let Some(p) = match_path("/api/motorcycles/:id/comment", path) {
        if method == Method::POST {
            return interact::comment(state, req, &p["id"]).await;
        }
    }
    if let Some(p) = match_path("/api/motorcycles/:id/comments", path) {
        if method == Method::GET {
            return interact::comments(state, req, &p["id"]).await;
        }
    }
    if let Some(p) = match_path("/api/motorcycles/:id", path) {
        if method == Method::GET {
            return catalog::get(state, req, &p["id"]).await;
        }
    }

    // --- Comments -------------------------------------------------------
    if let Some(p) = match_path("/api/comments/:id/like", path) {
        if method == Method::POST {
            return interact::like_comment(state, req, &p["id"]).await;
        }
    }
    if let Some(p) = match_path("/api/comments/:id/flag", path) {
        if method == Method::POST {
            return interact::flag_comment(state, req, &p["id"]).await;
        }
    }
    if let Some(p) = match_path("/api/comments/:id", path) {
        if method == Method::DELETE {
            return interact::delete_comment(state, req, &p["id"]).await;
        }
    }

    // --- Banners --------------------------------------------------------
    if path == "/api/banners" && method == Method::GET {
        return admin_api::live_banners(state).await;
    }
    if path == "/api/admin/banners" {
        if method == Method::GET {
            return admin_api::list_banners(state, req).await;
        }
        if method == Method::POST {
            return admin_api::create_banner(state, req).await;
        }
    }
    if let Some(p) = match_path("/api/admin/banners/:id", path) {
        if method == Method::PUT {
            return admin_api::update_banner(state, req, &p["id"]).await;
        }
        if method == Method::DELETE {
            return admin_api::delete_banner(state, req, &p["id"]).await;
        }
    }

    // --- Admin ----------------------------------------------------------
    if path == "/api/admin/stats" && method == Method::GET {
        return admin_api::stats(state, req).await;
    }
    if path == "/api/admin/users" && method == Method::GET {
        return admin_api::list_users(state, req).await;
    }
    if let Some(p) = match_path("/api/admin/users/:id/role", path) {
        if method == Method::PUT {
            return admin_api::set_role(state, req, &p["id"]).await;
        }
    }
    if path == "/api/admin/requests" && method == Method::GET {
        return community::admin_list_requests(state, req).await;
    }
    if let Some(p) = match_path("/api/admin/requests/:id", path) {
        if method == Method::PUT {
            return community::admin_respond_request(state, req, &p["id"]).await;
        }
    }

    // --- Update scheduler ----------------------------------------------
    if path == "/api/update-system/run-daily-update" && method == Method::POST {
        return updates::run_daily_update(state, req).await;
    }
    if let Some(p) = match_path("/api/update-system/job-status/:id", path) {
        if method == Method::GET {
            return updates::job_status(state, req, &p["id"]).await;
        }
    }
    if path == "/api/update-system/update-history" && method == Method::GET {
        return updates::update_history(state, req).await;
    }
    if path == "/api/update-system/regional-customizations" && method == Method::GET {
        return updates::regional_customizations(state, req).await;
    }
    if let Some(p) = match_path("/api/update-system/cancel/:id", path) {
        if method == Method::POST {
            return updates::cancel(state, req, &p["id"]).await;
        }
    }

    // --- Community ------------------------------------------------------
    if path == "/api/garage" {
        if method == Method::GET {
            return community::list_garage(state, req).await;
        }
        if method == Method::POST {
            return community::add_garage_item(state, req).await;
        }
    }
    if let Some(p) = match_path("/api/garage/:id", path) {
        if method == Method::PUT {
            return community::update_garage_item(state, req, &p["id"]).await;
        }
        if method == Method::DELETE {
            return community::remove_garage_item(state, req, &p["id"]).await;
        }
    }
    if path == "/api/groups" {
        if method == Method::GET {
            return community::list_groups(state, req).await;
        }
        if method == Method::POST {
            return community::create_group(state, req).await;
        }
    }
    if let Some(p) = match_path("/api/groups/:id/join", path) {
        if method == Method::POST {
            return community::join_group(state, req, &p["id"]).await;
        }
    }
    if let Some(p) = match_path("/api/groups/:id/leave", path) {
        if method == Method::POST {
            return community::leave_group(state, req, &p["id"]).await;
        }
    }
    if let Some(p) = match_path("/api/groups/:id", path) {
        if method == Method::GET {
            return community::get_group(state, &p["id"]).await;
        }
    }
    if path == "/api/achievements" && method == Method::GET {
        return community::list_achievements(state).await;
    }
    if path == "/api/achievements/me" && method == Method::GET {
        return community::my_achievements(state, req).await;
    }
    if path == "/api/requests" {
        if method == Method::GET {
            return community::list_my_requests(state, req).await;
        }
        if method == Method::POST {
            return community::create_request(state, req).await;
        }
    }
    if path == "/api/analytics/events" && method == Method::POST {
        return community::record_analytics(state, req).await;
    }

    Err(ApiError::not_found("route"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_decodes() {
        let params = parse_query(Some("search=royal+enfield&price_min=3%2C000&flag"));
        assert_eq!(params.get("search").map(String::as_str), Some("royal enfield"));
        assert_eq!(params.get("price_min").map(String::as_str), Some("3,000"));
        assert_eq!(params.get("flag").map(String::as_str), Some(""));
        assert!(parse_query(None).is_empty());
    }

    #[test]
    fn test_header_extraction() {
        let mut headers = http::HeaderMap::new();
        headers.insert("authorization", "Bearer abc.def.ghi".parse().unwrap());
        headers.insert("x-session-id", "  s-1  ".parse().unwrap());

        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));
        assert_eq!(session_header(&headers), Some("s-1"));

        let empty = http::HeaderMap::new();
        assert!(bearer_token(&empty).is_none());
        assert!(session_header(&empty).is_none());
    }
}
