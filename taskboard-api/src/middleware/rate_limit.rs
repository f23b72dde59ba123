//! Rate limiting middleware
//!
//! Token bucket rate limiting with in-process state, keyed by endpoint
//! class and client address. Registration and login carry stricter
//! quotas than the general task endpoints; each class refills
//! independently.
//!
//! # Algorithm
//!
//! - Tokens refill at a constant rate up to the quota's capacity
//! - Each request consumes 1 token
//! - Requests are rejected with 429 and a `Retry-After` header when the
//!   bucket is empty
//!
//! # Quotas
//!
//! Quotas are configured as "count/period" strings such as "5/minute",
//! read from `REGISTER_LIMIT`, `LOGIN_LIMIT` and `API_LIMIT`.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::error::ApiError;

/// A request allowance: `requests` per `period_seconds`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateQuota {
    /// Requests allowed per period, also the burst capacity
    pub requests: u32,

    /// Length of the period in seconds
    pub period_seconds: u64,
}

impl RateQuota {
    /// Parse a "count/period" string such as "5/minute"
    ///
    /// Accepted periods are "second", "minute" and "hour".
    pub fn parse(raw: &str) -> Result<Self, String> {
        let (count, period) = raw
            .trim()
            .split_once('/')
            .ok_or_else(|| format!("expected 'count/period', got '{}'", raw))?;

        let requests: u32 = count
            .trim()
            .parse()
            .map_err(|_| format!("invalid request count '{}'", count))?;

        if requests == 0 {
            return Err("request count must be positive".to_string());
        }

        let period_seconds = match period.trim().to_ascii_lowercase().as_str() {
            "second" => 1,
            "minute" => 60,
            "hour" => 3600,
            other => return Err(format!("unknown period '{}'", other)),
        };

        Ok(Self {
            requests,
            period_seconds,
        })
    }

    /// Token refill rate in tokens per second
    pub fn refill_rate(&self) -> f64 {
        self.requests as f64 / self.period_seconds as f64
    }
}

/// Token bucket state for one client and endpoint class
#[derive(Debug, Clone)]
struct TokenBucket {
    /// Current number of tokens
    tokens: f64,

    /// Last refill timestamp (Unix seconds)
    last_refill: u64,
}

impl TokenBucket {
    /// Creates a new full bucket
    fn new(capacity: u32) -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();

        TokenBucket {
            tokens: capacity as f64,
            last_refill: now,
        }
    }

    /// Refills tokens based on elapsed time
    fn refill(&mut self, rate: f64, capacity: u32) {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();

        let elapsed_secs = now.saturating_sub(self.last_refill) as f64;
        let new_tokens = elapsed_secs * rate;

        self.tokens = (self.tokens + new_tokens).min(capacity as f64);
        self.last_refill = now;
    }

    /// Attempts to consume N tokens
    fn try_consume(&mut self, count: f64) -> bool {
        if self.tokens >= count {
            self.tokens -= count;
            true
        } else {
            false
        }
    }

    /// Calculates seconds until N tokens are available
    fn seconds_until_available(&self, count: f64, rate: f64) -> u64 {
        let deficit = count - self.tokens;
        if deficit <= 0.0 {
            0
        } else {
            (deficit / rate).ceil() as u64
        }
    }
}

/// Shared rate limiter holding one bucket per key
///
/// Keys combine the endpoint class with the client address, so one
/// client exhausting its login quota does not affect its task quota or
/// anyone else's.
#[derive(Debug, Default)]
pub struct RateLimiter {
    buckets: Mutex<HashMap<String, TokenBucket>>,
}

impl RateLimiter {
    /// Create an empty limiter
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to take one token for `key` under `quota`
    ///
    /// Returns `Err(retry_after_seconds)` when the bucket is empty.
    pub fn try_acquire(&self, key: &str, quota: RateQuota) -> Result<(), u64> {
        let mut buckets = self.buckets.lock().unwrap();

        let bucket = buckets
            .entry(key.to_string())
            .or_insert_with(|| TokenBucket::new(quota.requests));

        bucket.refill(quota.refill_rate(), quota.requests);

        if bucket.try_consume(1.0) {
            Ok(())
        } else {
            Err(bucket.seconds_until_available(1.0, quota.refill_rate()))
        }
    }
}

/// Rate limiting middleware
///
/// Picks the quota by endpoint class (register, login, or general API)
/// and keys buckets by client IP. Requests carrying no connect info,
/// such as in-process test calls, share a single "local" key.
pub async fn rate_limit_layer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let path = request.uri().path();

    let (class, quota) = if path.ends_with("/register") {
        ("register", state.config.rate_limit.register)
    } else if path.ends_with("/login") {
        ("login", state.config.rate_limit.login)
    } else {
        ("api", state.config.rate_limit.api)
    };

    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "local".to_string());

    let key = format!("{}:{}", class, client);

    if let Err(retry_after) = state.limiter.try_acquire(&key, quota) {
        tracing::warn!(key = %key, retry_after, "Rate limit exceeded");
        return Err(ApiError::RateLimitExceeded {
            retry_after,
            message: format!("Rate limit exceeded. Try again in {} seconds", retry_after),
        });
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_parse_accepts_known_periods() {
        assert_eq!(
            RateQuota::parse("5/minute").unwrap(),
            RateQuota {
                requests: 5,
                period_seconds: 60
            }
        );
        assert_eq!(
            RateQuota::parse("2/second").unwrap(),
            RateQuota {
                requests: 2,
                period_seconds: 1
            }
        );
        assert_eq!(
            RateQuota::parse("1000/hour").unwrap(),
            RateQuota {
                requests: 1000,
                period_seconds: 3600
            }
        );
        assert_eq!(
            RateQuota::parse(" 10 / Minute ").unwrap(),
            RateQuota {
                requests: 10,
                period_seconds: 60
            }
        );
    }

    #[test]
    fn test_quota_parse_rejects_malformed_input() {
        assert!(RateQuota::parse("fast").is_err());
        assert!(RateQuota::parse("ten/minute").is_err());
        assert!(RateQuota::parse("0/minute").is_err());
        assert!(RateQuota::parse("5/fortnight").is_err());
    }

    #[test]
    fn test_quota_refill_rate() {
        let quota = RateQuota::parse("60/minute").unwrap();
        assert_eq!(quota.refill_rate(), 1.0);

        let quota = RateQuota::parse("10/minute").unwrap();
        assert!((quota.refill_rate() - 0.1667).abs() < 0.001);
    }

    #[test]
    fn test_token_bucket_new() {
        let bucket = TokenBucket::new(100);
        assert_eq!(bucket.tokens, 100.0);
        assert!(bucket.last_refill > 0);
    }

    #[test]
    fn test_token_bucket_consume() {
        let mut bucket = TokenBucket::new(10);
        assert!(bucket.try_consume(1.0));
        assert_eq!(bucket.tokens, 9.0);
        assert!(bucket.try_consume(5.0));
        assert_eq!(bucket.tokens, 4.0);
        assert!(!bucket.try_consume(10.0));
        assert_eq!(bucket.tokens, 4.0); // Unchanged after failed attempt
    }

    #[test]
    fn test_token_bucket_refill() {
        let mut bucket = TokenBucket {
            tokens: 5.0,
            last_refill: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap()
                .as_secs()
                - 10, // 10 seconds ago
        };

        // Refill at 1 token/sec for 10 seconds = 10 tokens
        bucket.refill(1.0, 100);
        assert!((bucket.tokens - 15.0).abs() < 0.1);
    }

    #[test]
    fn test_token_bucket_refill_capped() {
        let mut bucket = TokenBucket {
            tokens: 95.0,
            last_refill: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap()
                .as_secs()
                - 10, // 10 seconds ago
        };

        bucket.refill(1.0, 100);
        assert_eq!(bucket.tokens, 100.0); // Capped at capacity
    }

    #[test]
    fn test_token_bucket_seconds_until_available() {
        let bucket = TokenBucket {
            tokens: 2.0,
            last_refill: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap()
                .as_secs(),
        };

        // Need 5 tokens, have 2, rate is 1/sec -> need 3 seconds
        assert_eq!(bucket.seconds_until_available(5.0, 1.0), 3);

        // Already have enough
        assert_eq!(bucket.seconds_until_available(1.0, 1.0), 0);
    }

    #[test]
    fn test_limiter_blocks_after_quota_exhausted() {
        let limiter = RateLimiter::new();
        let quota = RateQuota {
            requests: 3,
            period_seconds: 60,
        };

        for _ in 0..3 {
            assert!(limiter.try_acquire("login:1.2.3.4", quota).is_ok());
        }

        let retry_after = limiter.try_acquire("login:1.2.3.4", quota).unwrap_err();
        assert!(retry_after >= 1);
    }

    #[test]
    fn test_limiter_tracks_keys_independently() {
        let limiter = RateLimiter::new();
        let quota = RateQuota {
            requests: 1,
            period_seconds: 60,
        };

        assert!(limiter.try_acquire("login:1.2.3.4", quota).is_ok());
        assert!(limiter.try_acquire("login:1.2.3.4", quota).is_err());

        // Different address, and different class for the same address,
        // both have their own buckets.
        assert!(limiter.try_acquire("login:5.6.7.8", quota).is_ok());
        assert!(limiter.try_acquire("api:1.2.3.4", quota).is_ok());
    }
}
