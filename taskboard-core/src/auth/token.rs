//! API tokens (JWT, HS256)
//!
//! Login hands out a signed, expiring token whose `sub` claim is the user's
//! database id. The token is the only thing a client must present on later
//! requests; the server resolves it back to a user on every call.
//!
//! Tokens are signed with HS256 using the server's `JWT_SECRET` and carry
//! `iat`, `nbf` and `exp` claims plus a fixed issuer.
//!
//! # Example
//!
//! ```
//! use taskboard_core::auth::token::{create_token, validate_token, Claims};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let secret = "a-secret-of-at-least-32-characters!!";
//! let token = create_token(&Claims::new(7), secret)?;
//!
//! let claims = validate_token(&token, secret)?;
//! assert_eq!(claims.sub, 7);
//! # Ok(())
//! # }
//! ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Issuer claim stamped into and required of every token
pub const ISSUER: &str = "taskboard";

/// Token lifetime used by [`Claims::new`]
const DEFAULT_TTL_HOURS: i64 = 24;

/// Errors that can occur during token operations
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Failed to create token: {0}")]
    CreateError(String),

    #[error("Token validation failed: {0}")]
    ValidationError(String),

    #[error("Token has expired")]
    Expired,

    #[error("Invalid token format: {0}")]
    InvalidFormat(String),

    #[error("Invalid issuer: expected {expected}, got {actual}")]
    InvalidIssuer { expected: String, actual: String },
}

/// Claims carried by a TaskBoard API token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id the token authenticates
    pub sub: i64,

    /// Issuer, always [`ISSUER`]
    pub iss: String,

    /// Issued-at, Unix seconds
    pub iat: i64,

    /// Expiration, Unix seconds
    pub exp: i64,

    /// Not-before, Unix seconds
    pub nbf: i64,
}

impl Claims {
    /// Claims for `user_id` with the default 24 hour lifetime
    pub fn new(user_id: i64) -> Self {
        Self::with_expiration(user_id, Duration::hours(DEFAULT_TTL_HOURS))
    }

    /// Claims for `user_id` expiring after `expires_in`
    pub fn with_expiration(user_id: i64, expires_in: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
            nbf: now.timestamp(),
        }
    }

    /// Whether the expiration claim is in the past
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Remaining lifetime, or `None` if already expired
    pub fn time_until_expiration(&self) -> Option<Duration> {
        let remaining = self.exp - Utc::now().timestamp();

        if remaining > 0 {
            Some(Duration::seconds(remaining))
        } else {
            None
        }
    }
}

/// Sign `claims` into a compact JWT
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, TokenError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key).map_err(|e| TokenError::CreateError(e.to_string()))
}

/// Decode and verify a token, returning its claims
///
/// Checks the signature, the `exp` and `nbf` claims, and that the issuer
/// matches [`ISSUER`].
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, TokenError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => TokenError::InvalidIssuer {
            expected: ISSUER.to_string(),
            actual: "unknown".to_string(),
        },
        jsonwebtoken::errors::ErrorKind::InvalidToken => TokenError::InvalidFormat(e.to_string()),
        _ => TokenError::ValidationError(e.to_string()),
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-that-is-long-enough!";

    #[test]
    fn test_create_and_validate_roundtrip() {
        let claims = Claims::new(42);
        let token = create_token(&claims, SECRET).unwrap();

        let decoded = validate_token(&token, SECRET).unwrap();

        assert_eq!(decoded.sub, 42);
        assert_eq!(decoded.iss, ISSUER);
        assert_eq!(decoded.exp, claims.exp);
    }

    #[test]
    fn test_validate_rejects_wrong_secret() {
        let token = create_token(&Claims::new(1), SECRET).unwrap();

        let result = validate_token(&token, "a-completely-different-secret-key!!!");

        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_garbage() {
        let result = validate_token("not.a.token", SECRET);

        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_expired_token() {
        let claims = Claims::with_expiration(1, Duration::seconds(-3600));
        let token = create_token(&claims, SECRET).unwrap();

        let result = validate_token(&token, SECRET);

        assert!(matches!(result.unwrap_err(), TokenError::Expired));
    }

    #[test]
    fn test_validate_rejects_foreign_issuer() {
        let mut claims = Claims::new(1);
        claims.iss = "someone-else".to_string();
        let token = create_token(&claims, SECRET).unwrap();

        let result = validate_token(&token, SECRET);

        assert!(matches!(
            result.unwrap_err(),
            TokenError::InvalidIssuer { .. }
        ));
    }

    #[test]
    fn test_claims_expiration_helpers() {
        let live = Claims::new(1);
        assert!(!live.is_expired());
        assert!(live.time_until_expiration().is_some());

        let dead = Claims::with_expiration(1, Duration::seconds(-60));
        assert!(dead.is_expired());
        assert!(dead.time_until_expiration().is_none());
    }
}
