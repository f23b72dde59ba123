//! Application state and router builder
//!
//! This module defines the shared application state and provides
//! a function to build the Axum router with all routes and middleware.
//!
//! # Example
//!
//! ```no_run
//! use taskboard_api::{app::{build_router, AppState}, config::Config};
//! use taskboard_core::db::pool::create_pool;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! let pool = create_pool(config.database.clone()).await?;
//! let state = AppState::new(pool, config);
//! let app = build_router(state);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, patch, post},
    Router,
};
use sqlx::AnyPool;
use taskboard_core::{auth::token, models::user::User};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{
    config::Config,
    error::ApiError,
    middleware::{rate_limit::RateLimiter, security::SecurityHeadersLayer},
};

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: AnyPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// In-process rate limiter shared across all routes
    pub limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: AnyPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
            limiter: Arc::new(RateLimiter::new()),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.auth.jwt_secret
    }
}

/// The authenticated user, inserted into request extensions by
/// [`jwt_auth_layer`] and consumed by handlers
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// The router is organized as follows:
/// ```text
/// /
/// ├── GET  /                        # Service banner (public)
/// ├── GET  /health                  # Health check (public)
/// ├── /auth/
/// │   ├── POST /register            # Rate limited (register quota)
/// │   ├── POST /login               # Rate limited (login quota)
/// │   └── GET  /me                  # Authenticated
/// └── /tasks/                       # Authenticated + API quota
///     ├── GET    /                  # List with filters and sorting
///     ├── POST   /                  # Create
///     ├── GET    /stats             # Statistics
///     ├── GET    /:id
///     ├── PUT    /:id
///     ├── PATCH  /:id/status
///     └── DELETE /:id
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Security headers
/// 4. Authentication and rate limiting (per-route basis)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Banner and health check (public, no auth)
    let public_routes = Router::new()
        .route("/", get(routes::health::root))
        .route("/health", get(routes::health::health_check));

    // Registration and login (public, per-class rate limits)
    let auth_public = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::rate_limit::rate_limit_layer,
        ));

    // Current-user lookup (requires bearer token)
    let auth_me = Router::new()
        .route("/me", get(routes::auth::me))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::rate_limit::rate_limit_layer,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Task routes (require bearer token + general API quota)
    let task_routes = Router::new()
        .route("/", get(routes::tasks::list_tasks))
        .route("/", post(routes::tasks::create_task))
        .route("/stats", get(routes::tasks::task_stats))
        .route(
            "/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route("/:id/status", patch(routes::tasks::update_task_status))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::rate_limit::rate_limit_layer,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Configure CORS based on environment
    let cors = if state.config.server.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        // Production mode: configure allowed origins
        let origins: Vec<HeaderValue> = state
            .config
            .server
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    // Combine all routes with middleware stack
    Router::new()
        .merge(public_routes)
        .nest("/auth", auth_public.merge(auth_me))
        .nest("/tasks", task_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.server.production))
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Extracts and validates the bearer token from the Authorization
/// header, loads the user it names, and injects [`CurrentUser`] into
/// request extensions. Every failure mode is a 401; a token whose user
/// no longer exists is treated the same as an invalid token.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("Expected Bearer token".to_string()))?;

    let claims = token::validate_token(token, state.jwt_secret())?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| {
            tracing::warn!(user_id = claims.sub, "Token references missing user");
            ApiError::Unauthorized("Invalid token".to_string())
        })?;

    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AuthConfig, RateLimitConfig, ServerConfig};
    use crate::middleware::rate_limit::RateQuota;
    use taskboard_core::db::{
        pool::{create_pool, DatabaseConfig},
        schema::DbBackend,
    };

    #[tokio::test]
    async fn test_router_builds_with_sqlite_state() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_path = dir.path().join("app.db");

        let pool = create_pool(DatabaseConfig {
            url: format!("sqlite://{}?mode=rwc", db_path.display()),
            backend: DbBackend::Sqlite,
            max_connections: 2,
            ..Default::default()
        })
        .await
        .expect("Failed to create pool");

        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
                production: false,
            },
            database: DatabaseConfig::default(),
            auth: AuthConfig {
                jwt_secret: "test-secret-key-at-least-32-bytes-long".to_string(),
                token_ttl_hours: 24,
            },
            rate_limit: RateLimitConfig {
                register: RateQuota::parse("5/minute").unwrap(),
                login: RateQuota::parse("10/minute").unwrap(),
                api: RateQuota::parse("100/minute").unwrap(),
            },
        };

        let state = AppState::new(pool, config);
        let _app = build_router(state);
    }
}
