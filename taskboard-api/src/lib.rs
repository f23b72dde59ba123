//! # TaskBoard API
//!
//! HTTP layer for the TaskBoard task management service: route handlers,
//! middleware, configuration, and the mapping from domain errors to HTTP
//! responses. The domain logic itself lives in `taskboard-core`.

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
