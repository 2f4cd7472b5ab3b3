//! BikeDream - Core
//!
//! Catalog-and-community engine for a motorcycle database:
//!
//! - [`store`] - lock-free collections with snapshot persistence
//! - [`auth`] - password credentials, signed tokens, sessions, roles
//! - [`query`] - filter/sort/paginate pipeline, suggestions, summaries
//! - [`interact`] - favorites, ratings, comments, achievements, groups
//! - [`admin`] - banners, user roles, aggregate stats
//! - [`scheduler`] - single-flight daily catalog update job
//! - [`http`] - hyper-based API surface rooted at `/api`
//!
//! The binary crate (`bikedream-cli`) wires configuration, logging and
//! the background tasks around [`http::HttpServer`].

pub mod admin;
pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod interact;
pub mod model;
pub mod query;
pub mod scheduler;
pub mod seed;
pub mod store;

pub use config::BikeDreamConfig;
pub use error::{ApiError, ApiResult};
pub use http::{AppState, HttpServer};
pub use store::Store;
