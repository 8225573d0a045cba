/// Status Service Library
///
/// Backend for an emoji-only status feed: authenticated users post short emoji
/// messages, anyone can read the global feed, per-user feeds and public profiles.
///
/// # Modules
///
/// - `handlers`: HTTP endpoints for the remote procedures
/// - `services`: post admission, feed assembly and profile lookup
/// - `context`: per-call context (caller identity + store handles)
/// - `db`: PostgreSQL repository for posts
/// - `identity`: identity provider adapter (user directory API)
/// - `rate_limit`: Redis sliding-window limiter guarding post creation
/// - `middleware`: session gate and request metrics
/// - `error`: error types and HTTP mapping
/// - `config`: configuration management
/// - `metrics`: Prometheus collectors
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod rate_limit;
pub mod services;
pub mod validators;

pub use config::Config;
pub use context::{CallContext, Stores, UserId};
pub use error::{AppError, Result};
