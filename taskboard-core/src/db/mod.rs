//! Database layer for TaskBoard
//!
//! TaskBoard runs against either SQLite (the default, zero-setup path) or
//! MySQL, selected at startup by the `DB_TYPE` environment variable. Both
//! backends are reached through sqlx's `Any` driver so the rest of the crate
//! is written once against [`sqlx::AnyPool`].
//!
//! # Modules
//!
//! - `pool`: Connection pool construction, health checks, pool statistics
//! - `schema`: Backend selection and idempotent table creation
//!
//! # Example
//!
//! ```no_run
//! use taskboard_core::db::pool::{create_pool, DatabaseConfig};
//! use taskboard_core::db::schema::{ensure_schema, DbBackend};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig {
//!         url: "sqlite://taskboard.db?mode=rwc".to_string(),
//!         ..Default::default()
//!     };
//!
//!     let pool = create_pool(config).await?;
//!     ensure_schema(&pool, DbBackend::Sqlite).await?;
//!     Ok(())
//! }
//! ```

pub mod pool;
pub mod schema;
