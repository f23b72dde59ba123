//! Configuration management for the API server
//!
//! Loads a type-safe configuration from environment variables, reading a
//! `.env` file first when one is present.
//!
//! # Environment Variables
//!
//! - `HOST`: Address to bind to (default: 0.0.0.0)
//! - `PORT`: Port to bind to (default: 8000)
//! - `DB_TYPE`: "sqlite" (default) or "mysql", plus the matching `DB_*`
//!   variables read by `taskboard_core::db::pool::DatabaseConfig`
//! - `JWT_SECRET`: Token signing key, required, at least 32 characters
//! - `TOKEN_TTL_HOURS`: Token lifetime (default: 24)
//! - `REGISTER_LIMIT`, `LOGIN_LIMIT`, `API_LIMIT`: Rate quotas in
//!   "count/period" form (defaults: 5/minute, 10/minute, 100/minute)
//! - `CORS_ORIGINS`: Comma-separated allowed origins (default: *)
//! - `ENVIRONMENT`: "production" enables strict transport headers
//!
//! # Example
//!
//! ```no_run
//! use taskboard_api::config::Config;
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! println!("Server will listen on {}", config.bind_address());
//! # Ok(())
//! # }
//! ```

use std::env;

use taskboard_core::db::pool::DatabaseConfig;

use crate::middleware::rate_limit::RateQuota;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Authentication configuration
    pub auth: AuthConfig,

    /// Per-endpoint-class rate limits
    pub rate_limit: RateLimitConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; a "*" entry means any origin
    pub cors_origins: Vec<String>,

    /// Whether this deployment is production-facing
    pub production: bool,
}

/// Authentication configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Token signing key
    ///
    /// Must be at least 32 characters. Generate with:
    /// `openssl rand -hex 32`
    pub jwt_secret: String,

    /// How long issued tokens stay valid, in hours
    pub token_ttl_hours: i64,
}

/// Rate limit quotas by endpoint class
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Quota for POST /auth/register
    pub register: RateQuota,

    /// Quota for POST /auth/login
    pub login: RateQuota,

    /// Quota for the task endpoints
    pub api: RateQuota,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Fails when `JWT_SECRET` is missing or too short, when a numeric
    /// variable does not parse, or when a rate limit string is malformed.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse::<u16>()?;

        let cors_origins: Vec<String> = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let production = env::var("ENVIRONMENT")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let database = DatabaseConfig::from_env()?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let token_ttl_hours = env::var("TOKEN_TTL_HOURS")
            .unwrap_or_else(|_| "24".to_string())
            .parse::<i64>()?;

        let register = parse_quota("REGISTER_LIMIT", "5/minute")?;
        let login = parse_quota("LOGIN_LIMIT", "10/minute")?;
        let api = parse_quota("API_LIMIT", "100/minute")?;

        Ok(Self {
            server: ServerConfig {
                host,
                port,
                cors_origins,
                production,
            },
            database,
            auth: AuthConfig {
                jwt_secret,
                token_ttl_hours,
            },
            rate_limit: RateLimitConfig {
                register,
                login,
                api,
            },
        })
    }

    /// The address the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_quota(var: &str, default: &str) -> anyhow::Result<RateQuota> {
    let raw = env::var(var).unwrap_or_else(|_| default.to_string());

    RateQuota::parse(&raw).map_err(|e| anyhow::anyhow!("{}: {}", var, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskboard_core::db::schema::DbBackend;

    fn test_config() -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8000,
                cors_origins: vec!["*".to_string()],
                production: false,
            },
            database: DatabaseConfig {
                url: "sqlite://test.db?mode=rwc".to_string(),
                backend: DbBackend::Sqlite,
                ..Default::default()
            },
            auth: AuthConfig {
                jwt_secret: "test-secret-key-at-least-32-bytes-long".to_string(),
                token_ttl_hours: 24,
            },
            rate_limit: RateLimitConfig {
                register: RateQuota::parse("5/minute").unwrap(),
                login: RateQuota::parse("10/minute").unwrap(),
                api: RateQuota::parse("100/minute").unwrap(),
            },
        }
    }

    #[test]
    fn test_bind_address() {
        let config = test_config();

        assert_eq!(config.bind_address(), "127.0.0.1:8000");
    }

    #[test]
    fn test_config_is_cloneable() {
        let config = test_config();
        let cloned = config.clone();

        assert_eq!(config.auth.jwt_secret, cloned.auth.jwt_secret);
        assert_eq!(config.rate_limit.api.requests, cloned.rate_limit.api.requests);
    }
}
