//! Authentication primitives for TaskBoard
//!
//! # Modules
//!
//! - [`password`]: Argon2id password hashing and verification
//! - [`token`]: Signed, expiring API tokens (JWT, HS256)
//!
//! # Example
//!
//! ```no_run
//! use taskboard_core::auth::password::{hash_password, verify_password};
//! use taskboard_core::auth::token::{create_token, validate_token, Claims};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let hash = hash_password("user_password")?;
//! assert!(verify_password("user_password", &hash)?);
//!
//! let claims = Claims::new(42);
//! let token = create_token(&claims, "a-secret-of-at-least-32-characters")?;
//! let decoded = validate_token(&token, "a-secret-of-at-least-32-characters")?;
//! assert_eq!(decoded.sub, 42);
//! # Ok(())
//! # }
//! ```

pub mod password;
pub mod token;
