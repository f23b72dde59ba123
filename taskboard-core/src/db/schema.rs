//! Schema setup for the task store
//!
//! TaskBoard keeps its schema small enough to manage with idempotent
//! `CREATE TABLE IF NOT EXISTS` statements run at startup, one dialect
//! per supported backend.
//!
//! Timestamps are stored as RFC 3339 text with microsecond precision and
//! a trailing `Z`. The encoding is fixed-width, so lexicographic order on
//! the column matches chronological order and plain `ORDER BY` works on
//! both backends. Due dates are stored as `YYYY-MM-DD` text. Status and
//! priority are stored as their lowercase wire names.

use sqlx::AnyPool;
use tracing::{debug, info};

/// Database backend selected via `DB_TYPE`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbBackend {
    /// File-backed SQLite, the zero-setup default
    Sqlite,
    /// MySQL over the network
    MySql,
}

impl DbBackend {
    /// Parse a `DB_TYPE` value, case-insensitively
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Some(Self::Sqlite),
            "mysql" => Some(Self::MySql),
            _ => None,
        }
    }

    /// Lowercase name, matching the accepted `DB_TYPE` values
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::MySql => "mysql",
        }
    }
}

/// Create the `users` and `tasks` tables if they do not exist
///
/// Safe to run on every startup. Statements are executed one at a time
/// because the `Any` driver prepares each query individually.
pub async fn ensure_schema(pool: &AnyPool, backend: DbBackend) -> Result<(), sqlx::Error> {
    info!(backend = backend.as_str(), "Ensuring database schema");

    for statement in schema_statements(backend) {
        debug!(statement = *statement, "Executing schema statement");
        sqlx::query(statement).execute(pool).await?;
    }

    info!("Database schema ready");
    Ok(())
}

fn schema_statements(backend: DbBackend) -> &'static [&'static str] {
    match backend {
        DbBackend::Sqlite => &[
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_id INTEGER NOT NULL REFERENCES users(id),
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                status TEXT NOT NULL DEFAULT 'todo',
                priority TEXT NOT NULL DEFAULT 'medium',
                due_date TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
            "CREATE INDEX IF NOT EXISTS idx_tasks_owner_id ON tasks (owner_id)",
        ],
        // MySQL has no CREATE INDEX IF NOT EXISTS, so the index is declared
        // inline. UNIQUE columns must be VARCHAR rather than TEXT.
        DbBackend::MySql => &[
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
                username VARCHAR(255) NOT NULL UNIQUE,
                email VARCHAR(255) NOT NULL UNIQUE,
                password_hash VARCHAR(255) NOT NULL,
                created_at VARCHAR(32) NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS tasks (
                id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
                owner_id BIGINT NOT NULL,
                title VARCHAR(255) NOT NULL,
                description TEXT NOT NULL,
                status VARCHAR(20) NOT NULL DEFAULT 'todo',
                priority VARCHAR(10) NOT NULL DEFAULT 'medium',
                due_date VARCHAR(10),
                created_at VARCHAR(32) NOT NULL,
                updated_at VARCHAR(32) NOT NULL,
                INDEX idx_tasks_owner_id (owner_id),
                CONSTRAINT fk_tasks_owner FOREIGN KEY (owner_id) REFERENCES users(id)
            )
            "#,
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_parse() {
        assert_eq!(DbBackend::parse("sqlite"), Some(DbBackend::Sqlite));
        assert_eq!(DbBackend::parse("MySQL"), Some(DbBackend::MySql));
        assert_eq!(DbBackend::parse(" mysql "), Some(DbBackend::MySql));
        assert_eq!(DbBackend::parse("postgres"), None);
        assert_eq!(DbBackend::parse(""), None);
    }

    #[test]
    fn test_backend_as_str_roundtrips() {
        for backend in [DbBackend::Sqlite, DbBackend::MySql] {
            assert_eq!(DbBackend::parse(backend.as_str()), Some(backend));
        }
    }

    #[test]
    fn test_schema_statements_cover_both_tables() {
        for backend in [DbBackend::Sqlite, DbBackend::MySql] {
            let statements = schema_statements(backend);
            assert!(statements
                .iter()
                .any(|s| s.contains("CREATE TABLE IF NOT EXISTS users")));
            assert!(statements
                .iter()
                .any(|s| s.contains("CREATE TABLE IF NOT EXISTS tasks")));
        }
    }
}
