//! Error taxonomy shared by every engine in the crate.
//!
//! Engines return [`ApiError`] values; the HTTP surface is the single place
//! that maps them onto status codes. Nothing below the HTTP layer knows
//! about status codes.

use crate::store::StoreError;

/// Result alias used throughout the engines.
pub type ApiResult<T> = Result<T, ApiError>;

/// Domain error taxonomy.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Malformed payload or query input (bad number, unknown enum value).
    #[error("invalid input for `{field}`: {message}")]
    InvalidInput { field: String, message: String },

    /// A well-formed field that fails a semantic constraint (length, range).
    #[error("validation failed for `{field}`: {message}")]
    Validation { field: String, message: String },

    /// Missing or expired credential.
    #[error("authentication required")]
    Unauthenticated,

    /// Authenticated but lacking the required role.
    #[error("requires role {required} or higher")]
    Forbidden { required: String },

    /// Absent resource.
    #[error("{resource} not found")]
    NotFound { resource: String },

    /// Unique-key violation or concurrent state clash. Carries a hint at
    /// the conflicting id so clients can act on it.
    #[error("conflict with existing {resource} {id}")]
    Conflict { resource: String, id: String },

    /// Per-user mutation budget exhausted.
    #[error("too many requests")]
    RateLimited,

    /// Store or downstream failure; retryable.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// Everything else. Logged with a correlation id at the HTTP boundary.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Machine-readable error code included in every error response.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidInput { .. } => "invalid_input",
            ApiError::Validation { .. } => "validation_failed",
            ApiError::Unauthenticated => "unauthenticated",
            ApiError::Forbidden { .. } => "forbidden",
            ApiError::NotFound { .. } => "not_found",
            ApiError::Conflict { .. } => "conflict",
            ApiError::RateLimited => "rate_limited",
            ApiError::Unavailable(_) => "backend_unavailable",
            ApiError::Internal(_) => "internal",
        }
    }

    /// Shorthand for [`ApiError::InvalidInput`].
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::InvalidInput { field: field.into(), message: message.into() }
    }

    /// Shorthand for [`ApiError::Validation`].
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Validation { field: field.into(), message: message.into() }
    }

    /// Shorthand for [`ApiError::NotFound`].
    pub fn not_found(resource: impl Into<String>) -> Self {
        ApiError::NotFound { resource: resource.into() }
    }

    /// Shorthand for [`ApiError::Conflict`].
    pub fn conflict(resource: impl Into<String>, id: impl Into<String>) -> Self {
        ApiError::Conflict { resource: resource.into(), id: id.into() }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { collection, id: _ } => {
                ApiError::NotFound { resource: collection.to_string() }
            }
            StoreError::Conflict { collection, id } => {
                ApiError::Conflict { resource: collection.to_string(), id }
            }
            StoreError::Unavailable(msg) => ApiError::Unavailable(msg),
        }
    }
}
