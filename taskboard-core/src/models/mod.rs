//! Persistent models for TaskBoard
//!
//! # Models
//!
//! - `user`: Accounts that own tasks and authenticate with a password
//! - `task`: The tasks themselves, always scoped to an owning user
//!
//! Rows travel through sqlx's `Any` driver, which only speaks the base
//! scalar types, so every model implements `FromRow` by hand and
//! timestamps are stored as text. The helpers below define that encoding
//! in one place.
//!
//! # Example
//!
//! ```no_run
//! use taskboard_core::models::user::{CreateUser, User};
//! use taskboard_core::db::pool::{create_pool, DatabaseConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool(DatabaseConfig::default()).await?;
//!
//! let user = User::create(
//!     &pool,
//!     CreateUser {
//!         username: "ada".to_string(),
//!         email: "ada@example.com".to_string(),
//!         password_hash: "$argon2id$...".to_string(),
//!     },
//! )
//! .await?;
//!
//! println!("Created user {}", user.id);
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::any::AnyRow;
use sqlx::Row;

pub mod task;
pub mod user;

/// Encode a timestamp for storage
///
/// RFC 3339 with exactly six fractional digits and a `Z` suffix. Fixed
/// width, so lexicographic order on the column equals chronological order.
pub(crate) fn encode_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Decode a stored timestamp column back into `DateTime<Utc>`
pub(crate) fn decode_timestamp(row: &AnyRow, column: &str) -> Result<DateTime<Utc>, sqlx::Error> {
    let raw: String = row.try_get(column)?;

    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| sqlx::Error::ColumnDecode {
            index: column.to_string(),
            source: Box::new(e),
        })
}
