//! Common test utilities for integration tests
//!
//! This module provides shared infrastructure for integration tests:
//! - Per-test SQLite database in a temp directory
//! - Test user creation and token generation
//! - Direct-store task seeding for fixtures

use axum::response::Response;
use sqlx::AnyPool;
use taskboard_api::app::{build_router, AppState};
use taskboard_api::config::{AuthConfig, Config, RateLimitConfig, ServerConfig};
use taskboard_api::middleware::rate_limit::RateQuota;
use taskboard_core::auth::token::{create_token, Claims};
use taskboard_core::db::pool::{create_pool, DatabaseConfig};
use taskboard_core::db::schema::{ensure_schema, DbBackend};
use taskboard_core::models::task::{CreateTask, Task, TaskPriority, TaskStatus};
use taskboard_core::models::user::{CreateUser, User};
use tempfile::TempDir;

/// Test context containing all necessary resources
///
/// Each context owns a fresh database file, so tests never observe one
/// another's rows or rate-limit buckets.
pub struct TestContext {
    pub db: AnyPool,
    pub app: axum::Router,
    pub config: Config,
    pub user: User,
    pub token: String,
    // Deletes the database file when the context is dropped
    _dir: TempDir,
}

impl TestContext {
    /// Creates a test context with quotas generous enough to never
    /// trip during normal tests
    pub async fn new() -> anyhow::Result<Self> {
        Self::with_rate_limits("100/minute", "100/minute", "1000/minute").await
    }

    /// Creates a test context with explicit rate-limit quotas
    pub async fn with_rate_limits(
        register: &str,
        login: &str,
        api: &str,
    ) -> anyhow::Result<Self> {
        let dir = tempfile::tempdir()?;
        let db_path = dir.path().join("api.db");

        let db_config = DatabaseConfig {
            url: format!("sqlite://{}?mode=rwc", db_path.display()),
            backend: DbBackend::Sqlite,
            max_connections: 5,
            ..Default::default()
        };

        let db = create_pool(db_config.clone()).await?;
        ensure_schema(&db, DbBackend::Sqlite).await?;

        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
                production: false,
            },
            database: db_config,
            auth: AuthConfig {
                jwt_secret: "integration-test-secret-at-least-32-bytes".to_string(),
                token_ttl_hours: 24,
            },
            rate_limit: RateLimitConfig {
                register: RateQuota::parse(register).map_err(|e| anyhow::anyhow!(e))?,
                login: RateQuota::parse(login).map_err(|e| anyhow::anyhow!(e))?,
                api: RateQuota::parse(api).map_err(|e| anyhow::anyhow!(e))?,
            },
        };

        // Created directly through the store; tests that exercise the
        // register endpoint create their own users through the API.
        let user = User::create(
            &db,
            CreateUser {
                username: "testuser".to_string(),
                email: "testuser@example.com".to_string(),
                password_hash: "test_hash".to_string(), // Never verified in these tests
            },
        )
        .await?;

        let claims = Claims::new(user.id);
        let token = create_token(&claims, &config.auth.jwt_secret)?;

        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            user,
            token,
            _dir: dir,
        })
    }

    /// Returns authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Creates an additional user directly in the store, with a valid token
pub async fn create_user_with_token(
    ctx: &TestContext,
    username: &str,
) -> anyhow::Result<(User, String)> {
    let user = User::create(
        &ctx.db,
        CreateUser {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password_hash: "test_hash".to_string(),
        },
    )
    .await?;

    let claims = Claims::new(user.id);
    let token = create_token(&claims, &ctx.config.auth.jwt_secret)?;

    Ok((user, token))
}

/// Seeds a task for the context user directly through the store
pub async fn seed_task(
    ctx: &TestContext,
    title: &str,
    description: &str,
    status: TaskStatus,
    priority: TaskPriority,
    due_date: Option<chrono::NaiveDate>,
) -> anyhow::Result<Task> {
    let task = Task::create(
        &ctx.db,
        ctx.user.id,
        CreateTask {
            title: title.to_string(),
            description: description.to_string(),
            status,
            priority,
            due_date,
        },
    )
    .await?;

    Ok(task)
}

/// Reads a response body as JSON
pub async fn read_json(response: Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");

    serde_json::from_slice(&body).expect("Response body was not valid JSON")
}
