//! Authentication endpoints
//!
//! This module provides user authentication endpoints:
//! - Registration
//! - Login
//! - Current-user lookup
//!
//! # Endpoints
//!
//! - `POST /auth/register` - Register new user
//! - `POST /auth/login` - Login and get a bearer token
//! - `GET /auth/me` - Return the authenticated user

use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use taskboard_core::{
    auth::{
        password,
        token::{self, Claims},
    },
    models::user::{CreateUser, User},
};
use validator::Validate;

use crate::{
    app::{AppState, CurrentUser},
    error::{ApiError, ApiResult, ValidationErrorDetail},
};

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Desired username, unique across all users
    #[validate(length(min = 1, max = 255, message = "Username must be between 1 and 255 characters"))]
    pub username: String,

    /// Email address, unique across all users
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password (will be validated for strength)
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
}

/// Login request
///
/// `username` accepts either the username or the email address.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username or email address
    #[validate(length(min = 1, message = "Username must not be empty"))]
    pub username: String,

    /// Password
    pub password: String,
}

/// Public view of a user, never carrying the password hash
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    /// User ID
    pub id: i64,

    /// Username
    pub username: String,

    /// Email address
    pub email: String,

    /// Account creation time
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests
    pub token: String,

    /// The authenticated user
    pub user: UserResponse,
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /auth/register
/// Content-Type: application/json
///
/// {
///   "username": "alice",
///   "email": "alice@example.com",
///   "password": "testpass123"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "id": 1,
///   "username": "alice",
///   "email": "alice@example.com",
///   "created_at": "2024-01-01T00:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// - `409 Conflict`: Username or email already registered
/// - `422 Unprocessable Entity`: Validation failed
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    req.validate()?;

    // Strength rules beyond the type-level length check
    password::validate_password_strength(&req.password).map_err(|message| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "password".to_string(),
            message,
        }])
    })?;

    if User::find_by_username(&state.db, &req.username).await?.is_some() {
        return Err(ApiError::Conflict("Username already registered".to_string()));
    }
    if User::find_by_email(&state.db, &req.email).await?.is_some() {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    let password_hash = password::hash_password(&req.password)?;

    // The unique indexes backstop the pre-checks under concurrent
    // registration; a driver-level violation still maps to 409.
    let user = User::create(
        &state.db,
        CreateUser {
            username: req.username,
            email: req.email,
            password_hash,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, username = %user.username, "User registered");

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Login endpoint
///
/// Authenticates by username or email and returns a bearer token.
///
/// # Endpoint
///
/// ```text
/// POST /auth/login
/// Content-Type: application/json
///
/// {
///   "username": "alice",
///   "password": "testpass123"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "token": "eyJ...",
///   "user": { "id": 1, "username": "alice", "email": "alice@example.com", "created_at": "..." }
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid credentials (identical for unknown
///   user and wrong password)
/// - `422 Unprocessable Entity`: Validation failed
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate()?;

    let user = match User::find_by_identity(&state.db, &req.username).await? {
        Some(user) => user,
        None => {
            tracing::warn!(identity = %req.username, "Login rejected: unknown identity");
            return Err(ApiError::Unauthorized(
                "Invalid email or password".to_string(),
            ));
        }
    };

    if !password::verify_password(&req.password, &user.password_hash)? {
        tracing::warn!(user_id = user.id, "Login rejected: wrong password");
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let claims = Claims::with_expiration(
        user.id,
        Duration::hours(state.config.auth.token_ttl_hours),
    );
    let token = token::create_token(&claims, state.jwt_secret())?;

    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(LoginResponse {
        token,
        user: user.into(),
    }))
}

/// Current-user endpoint
///
/// Returns the user resolved from the bearer token by the auth
/// middleware.
pub async fn me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> ApiResult<Json<UserResponse>> {
    Ok(Json(user.into()))
}
