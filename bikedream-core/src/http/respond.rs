//! Response shaping and the single error-to-status mapping.

use bytes::Bytes;
use http::StatusCode;
use http_body_util::Full;
use hyper::Response;
use serde::Serialize;

use crate::error::ApiError;

pub type ApiResponse = Response<Full<Bytes>>;

/// Serialize `body` as a JSON response with the given status.
pub fn json<T: Serialize>(status: StatusCode, body: &T) -> ApiResponse {
    let payload = serde_json::to_vec(body).unwrap_or_else(|e| {
        log::error!("Response serialization failed: {e}");
        br#"{"error":{"code":"internal","message":"response serialization failed"}}"#.to_vec()
    });
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(payload)))
        .expect("static response parts are valid")
}

pub fn ok<T: Serialize>(body: &T) -> ApiResponse {
    json(StatusCode::OK, body)
}

pub fn created<T: Serialize>(body: &T) -> ApiResponse {
    json(StatusCode::CREATED, body)
}

pub fn no_content() -> ApiResponse {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .body(Full::new(Bytes::new()))
        .expect("static response parts are valid")
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: ErrorDetail<'a>,
    correlation_id: &'a str,
}

#[derive(Serialize)]
struct ErrorDetail<'a> {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    conflict_id: Option<&'a str>,
}

/// Map a domain error onto its status code and wire shape. This is the
/// only place status codes are assigned.
pub fn error(err: &ApiError, correlation_id: &str) -> ApiResponse {
    let status = match err {
        ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
        ApiError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
        ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
        ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
        ApiError::Conflict { .. } => StatusCode::CONFLICT,
        ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        log::error!("[{correlation_id}] internal error: {err}");
    }

    let field = match err {
        ApiError::InvalidInput { field, .. } | ApiError::Validation { field, .. } => {
            Some(field.as_str())
        }
        _ => None,
    };
    let conflict_id = match err {
        ApiError::Conflict { id, .. } => Some(id.as_str()),
        _ => None,
    };

    json(
        status,
        &ErrorBody {
            error: ErrorDetail { code: err.code(), message: err.to_string(), field, conflict_id },
            correlation_id,
        },
    )
}
