//! Task model and database operations
//!
//! Tasks are the core entity of TaskBoard. Every task belongs to exactly
//! one user, and every operation here is scoped by that owner: a task id
//! belonging to someone else behaves exactly like an id that does not
//! exist. That rule lives in these queries, not just in the HTTP layer.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE tasks (
//!     id INTEGER PRIMARY KEY AUTOINCREMENT,
//!     owner_id INTEGER NOT NULL REFERENCES users(id),
//!     title TEXT NOT NULL,
//!     description TEXT NOT NULL DEFAULT '',
//!     status TEXT NOT NULL DEFAULT 'todo',
//!     priority TEXT NOT NULL DEFAULT 'medium',
//!     due_date TEXT,
//!     created_at TEXT NOT NULL,
//!     updated_at TEXT NOT NULL
//! );
//! ```
//!
//! # Example
//!
//! ```no_run
//! use taskboard_core::models::task::{CreateTask, Task, TaskPriority, TaskStatus};
//! use taskboard_core::db::pool::{create_pool, DatabaseConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool(DatabaseConfig::default()).await?;
//!
//! let task = Task::create(
//!     &pool,
//!     1,
//!     CreateTask {
//!         title: "Write launch notes".to_string(),
//!         description: String::new(),
//!         status: TaskStatus::Todo,
//!         priority: TaskPriority::High,
//!         due_date: None,
//!     },
//! )
//! .await?;
//!
//! assert_eq!(task.created_at, task.updated_at);
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::any::AnyRow;
use sqlx::AnyPool;
use sqlx::{FromRow, Row};

use super::{decode_timestamp, encode_timestamp};

/// Workflow state of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started yet
    Todo,

    /// Currently being worked on
    InProgress,

    /// Finished
    Done,
}

impl TaskStatus {
    /// Wire and storage name
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
        }
    }

    /// Parse a storage value back into a status
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "todo" => Some(TaskStatus::Todo),
            "in_progress" => Some(TaskStatus::InProgress),
            "done" => Some(TaskStatus::Done),
            _ => None,
        }
    }
}

/// Priority of a task
///
/// Variants are declared lowest first, so the derived ordering ranks
/// `Low < Medium < High` and can drive priority sorting directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    /// Wire and storage name
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }

    /// Parse a storage value back into a priority
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "low" => Some(TaskPriority::Low),
            "medium" => Some(TaskPriority::Medium),
            "high" => Some(TaskPriority::High),
            _ => None,
        }
    }
}

/// A task owned by a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Row id, assigned by the database
    pub id: i64,

    /// Owning user's id
    pub owner_id: i64,

    /// Short summary, never empty after trimming
    pub title: String,

    /// Free-form details, empty string when absent
    pub description: String,

    /// Workflow state
    pub status: TaskStatus,

    /// Priority level
    pub priority: TaskPriority,

    /// Optional calendar due date
    pub due_date: Option<NaiveDate>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last modified
    ///
    /// Equal to `created_at` until the first update.
    pub updated_at: DateTime<Utc>,
}

impl FromRow<'_, AnyRow> for Task {
    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        let status_raw: String = row.try_get("status")?;
        let status = TaskStatus::parse(&status_raw).ok_or_else(|| sqlx::Error::ColumnDecode {
            index: "status".into(),
            source: format!("unknown task status '{}'", status_raw).into(),
        })?;

        let priority_raw: String = row.try_get("priority")?;
        let priority =
            TaskPriority::parse(&priority_raw).ok_or_else(|| sqlx::Error::ColumnDecode {
                index: "priority".into(),
                source: format!("unknown task priority '{}'", priority_raw).into(),
            })?;

        let due_date = match row.try_get::<Option<String>, _>("due_date")? {
            Some(raw) => Some(NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|e| {
                sqlx::Error::ColumnDecode {
                    index: "due_date".into(),
                    source: Box::new(e),
                }
            })?),
            None => None,
        };

        Ok(Self {
            id: row.try_get("id")?,
            owner_id: row.try_get("owner_id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            status,
            priority,
            due_date,
            created_at: decode_timestamp(row, "created_at")?,
            updated_at: decode_timestamp(row, "updated_at")?,
        })
    }
}

/// Input for creating a task
///
/// Callers are expected to have normalized the text fields already;
/// defaults for omitted request fields are applied before this struct is
/// built.
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
}

/// Input for updating a task
///
/// `None` means "leave unchanged". There is no way to clear a due date
/// through an update; omitting the field keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<NaiveDate>,
}

impl Task {
    /// Insert a new task for `owner_id` and return the stored row
    ///
    /// Both timestamps are set to the same instant, so a freshly created
    /// task always has `created_at == updated_at`.
    pub async fn create(
        pool: &AnyPool,
        owner_id: i64,
        data: CreateTask,
    ) -> Result<Self, sqlx::Error> {
        let now = encode_timestamp(Utc::now());

        let result = sqlx::query(
            r#"
            INSERT INTO tasks (owner_id, title, description, status, priority, due_date, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(owner_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.status.as_str())
        .bind(data.priority.as_str())
        .bind(data.due_date.map(|d| d.format("%Y-%m-%d").to_string()))
        .bind(now.clone())
        .bind(now)
        .execute(pool)
        .await?;

        let id = result
            .last_insert_id()
            .ok_or_else(|| sqlx::Error::Protocol("INSERT did not report a row id".into()))?;

        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, owner_id, title, description, status, priority, due_date, created_at, updated_at
            FROM tasks
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Fetch a task by id, visible only to its owner
    pub async fn find_by_id_and_owner(
        pool: &AnyPool,
        id: i64,
        owner_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, owner_id, title, description, status, priority, due_date, created_at, updated_at
            FROM tasks
            WHERE id = ? AND owner_id = ?
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// List every task owned by `owner_id`, newest first
    ///
    /// Ties on `created_at` fall back to descending id, keeping the order
    /// deterministic for rows created in the same microsecond.
    pub async fn list_by_owner(pool: &AnyPool, owner_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, owner_id, title, description, status, priority, due_date, created_at, updated_at
            FROM tasks
            WHERE owner_id = ?
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Apply a partial update to an owned task
    ///
    /// Only the fields present in `data` are written. `updated_at` is
    /// refreshed whenever the row matches, even if no other field is
    /// supplied. Returns `None` when the task does not exist for this
    /// owner.
    pub async fn update(
        pool: &AnyPool,
        id: i64,
        owner_id: i64,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build the SET clause from the present fields; bind order below
        // must match the order the placeholders are pushed here.
        let mut query = String::from("UPDATE tasks SET updated_at = ?");

        if data.title.is_some() {
            query.push_str(", title = ?");
        }
        if data.description.is_some() {
            query.push_str(", description = ?");
        }
        if data.status.is_some() {
            query.push_str(", status = ?");
        }
        if data.priority.is_some() {
            query.push_str(", priority = ?");
        }
        if data.due_date.is_some() {
            query.push_str(", due_date = ?");
        }

        query.push_str(" WHERE id = ? AND owner_id = ?");

        let mut q = sqlx::query(&query).bind(encode_timestamp(Utc::now()));

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(status) = data.status {
            q = q.bind(status.as_str());
        }
        if let Some(priority) = data.priority {
            q = q.bind(priority.as_str());
        }
        if let Some(due_date) = data.due_date {
            q = q.bind(due_date.format("%Y-%m-%d").to_string());
        }

        q.bind(id).bind(owner_id).execute(pool).await?;

        Self::find_by_id_and_owner(pool, id, owner_id).await
    }

    /// Set just the status of an owned task
    ///
    /// Returns the updated row, or `None` when the task does not exist
    /// for this owner.
    pub async fn update_status(
        pool: &AnyPool,
        id: i64,
        owner_id: i64,
        status: TaskStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE tasks
            SET status = ?, updated_at = ?
            WHERE id = ? AND owner_id = ?
            "#,
        )
        .bind(status.as_str())
        .bind(encode_timestamp(Utc::now()))
        .bind(id)
        .bind(owner_id)
        .execute(pool)
        .await?;

        Self::find_by_id_and_owner(pool, id, owner_id).await
    }

    /// Delete an owned task
    ///
    /// Returns `true` if a row was removed, `false` when the task does
    /// not exist for this owner.
    pub async fn delete(pool: &AnyPool, id: i64, owner_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ? AND owner_id = ?")
            .bind(id)
            .bind(owner_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_storage_names_roundtrip() {
        for status in [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done] {
            assert_eq!(TaskStatus::parse(status.as_str()), Some(status));
        }

        assert_eq!(TaskStatus::parse("cancelled"), None);
        assert_eq!(TaskStatus::parse(""), None);
    }

    #[test]
    fn test_priority_storage_names_roundtrip() {
        for priority in [TaskPriority::Low, TaskPriority::Medium, TaskPriority::High] {
            assert_eq!(TaskPriority::parse(priority.as_str()), Some(priority));
        }

        assert_eq!(TaskPriority::parse("urgent"), None);
    }

    #[test]
    fn test_priority_ordering() {
        assert!(TaskPriority::Low < TaskPriority::Medium);
        assert!(TaskPriority::Medium < TaskPriority::High);
    }

    #[test]
    fn test_status_serde_wire_names() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"in_progress\""
        );

        let parsed: TaskStatus = serde_json::from_str("\"done\"").unwrap();
        assert_eq!(parsed, TaskStatus::Done);
    }

    #[test]
    fn test_priority_serde_wire_names() {
        assert_eq!(serde_json::to_string(&TaskPriority::High).unwrap(), "\"high\"");

        let parsed: TaskPriority = serde_json::from_str("\"low\"").unwrap();
        assert_eq!(parsed, TaskPriority::Low);
    }

    #[test]
    fn test_update_task_default_changes_nothing() {
        let update = UpdateTask::default();

        assert!(update.title.is_none());
        assert!(update.description.is_none());
        assert!(update.status.is_none());
        assert!(update.priority.is_none());
        assert!(update.due_date.is_none());
    }
}
