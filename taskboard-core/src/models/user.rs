//! User model and database operations
//!
//! Users own tasks and authenticate with a username (or email) plus
//! password. Passwords are stored as Argon2id hashes, never in plaintext.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE users (
//!     id INTEGER PRIMARY KEY AUTOINCREMENT,
//!     username TEXT NOT NULL UNIQUE,
//!     email TEXT NOT NULL UNIQUE,
//!     password_hash TEXT NOT NULL,
//!     created_at TEXT NOT NULL
//! );
//! ```
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
//! let found = User::find_by_username(&pool, "ada").await?;
//! assert_eq!(found.map(|u| u.id), Some(user.id));
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::any::AnyRow;
use sqlx::AnyPool;
use sqlx::{FromRow, Row};

use super::{decode_timestamp, encode_timestamp};

/// A registered account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Row id, assigned by the database
    pub id: i64,

    /// Unique login name
    pub username: String,

    /// Unique email address
    pub email: String,

    /// Argon2id password hash
    ///
    /// Must never be exposed through the API; response types copy the
    /// other fields and leave this one behind.
    pub password_hash: String,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

impl FromRow<'_, AnyRow> for User {
    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            created_at: decode_timestamp(row, "created_at")?,
        })
    }
}

/// Input for creating a new user
///
/// The password must already be hashed by the caller.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

impl User {
    /// Insert a new user and return the stored row
    ///
    /// # Errors
    ///
    /// Returns a database error if the username or email collides with an
    /// existing row (unique constraint violation) or the connection fails.
    pub async fn create(pool: &AnyPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let created_at = encode_timestamp(Utc::now());

        let result = sqlx::query(
            r#"
            INSERT INTO users (username, email, password_hash, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(data.username)
        .bind(data.email)
        .bind(data.password_hash)
        .bind(created_at)
        .execute(pool)
        .await?;

        let id = result
            .last_insert_id()
            .ok_or_else(|| sqlx::Error::Protocol("INSERT did not report a row id".into()))?;

        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Look up a user by id
    pub async fn find_by_id(pool: &AnyPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Look up a user by exact username
    pub async fn find_by_username(
        pool: &AnyPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Look up a user by exact email address
    pub async fn find_by_email(pool: &AnyPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Look up a user by username or email
    ///
    /// Login accepts either identifier in a single field; this resolves
    /// whichever one was supplied.
    pub async fn find_by_identity(
        pool: &AnyPool,
        identity: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE username = ? OR email = ?
            "#,
        )
        .bind(identity)
        .bind(identity)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Delete a user by id
    ///
    /// Returns `true` if a row was removed, `false` if the id was unknown.
    pub async fn delete(pool: &AnyPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_user_struct() {
        let data = CreateUser {
            username: "testuser".to_string(),
            email: "test@example.com".to_string(),
            password_hash: "$argon2id$stub".to_string(),
        };

        assert_eq!(data.username, "testuser");
        assert_eq!(data.email, "test@example.com");
    }

    // Database operations are covered by the integration tests in
    // tests/store_tests.rs.
}
