//! Service banner and health check endpoints
//!
//! # Endpoints
//!
//! - `GET /` - Service banner with name and version
//! - `GET /health` - Health check verifying database connectivity
//!
//! # Response
//!
//! ```json
//! {
//!   "status": "healthy",
//!   "database": "connected",
//!   "pool": { "active_connections": 1, "idle_connections": 4, "total_connections": 5 }
//! }
//! ```

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use taskboard_core::db::pool::{self, PoolStats};

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};

/// Service banner response
#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    /// Human-readable service description
    pub message: String,

    /// Application version
    pub version: String,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Database status
    pub database: String,

    /// Connection pool usage
    pub pool: PoolStats,
}

/// Service banner handler
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "TaskBoard API is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Health check handler
///
/// Verifies database connectivity and reports connection pool usage.
/// Returns `503 Service Unavailable` when the database does not answer.
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    if let Err(e) = pool::health_check(&state.db).await {
        tracing::error!(error = %e, "Health check failed: database unreachable");
        return Err(ApiError::ServiceUnavailable(
            "Database connection failed".to_string(),
        ));
    }

    let stats = pool::get_pool_stats(&state.db);
    tracing::debug!(
        active = stats.active_connections,
        idle = stats.idle_connections,
        "Database pool status"
    );

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        database: "connected".to_string(),
        pool: stats,
    }))
}
