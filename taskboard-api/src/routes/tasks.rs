//! Task endpoints
//!
//! CRUD, filtering, and statistics for the authenticated user's tasks.
//! Every operation is owner-scoped: a task belonging to another user is
//! indistinguishable from a missing one (404 either way).
//!
//! # Endpoints
//!
//! - `GET /tasks` - List tasks with optional filters and sorting
//! - `POST /tasks` - Create a task
//! - `GET /tasks/stats` - Aggregate counts and completion rate
//! - `GET /tasks/:id` - Fetch one task
//! - `PUT /tasks/:id` - Partial update
//! - `PATCH /tasks/:id/status` - Change status only
//! - `DELETE /tasks/:id` - Delete a task
//!
//! # Query parameters (list)
//!
//! ```text
//! GET /tasks?status=todo&priority=high&search=deploy&sort_by=due_date&order=asc
//! ```

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use taskboard_core::{
    models::task::{CreateTask, Task, TaskPriority, TaskStatus, UpdateTask},
    query::{filter_and_sort, TaskQuery},
    stats::{self, TaskStats},
};
use validator::Validate;

use crate::{
    app::{AppState, CurrentUser},
    error::{ApiError, ApiResult, ValidationErrorDetail},
};

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Task title, stripped of surrounding whitespace on write
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: String,

    /// Optional description, stored as an empty string when omitted
    pub description: Option<String>,

    /// Initial status, defaults to `todo`
    pub status: Option<TaskStatus>,

    /// Initial priority, defaults to `medium`
    pub priority: Option<TaskPriority>,

    /// Optional due date (`YYYY-MM-DD`)
    pub due_date: Option<NaiveDate>,
}

/// Update task request
///
/// All fields optional; absent fields are left unchanged.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    /// New title
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New status
    pub status: Option<TaskStatus>,

    /// New priority
    pub priority: Option<TaskPriority>,

    /// New due date
    pub due_date: Option<NaiveDate>,
}

/// Status-only update request
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    /// New status
    pub status: TaskStatus,
}

/// Public view of a task
///
/// The owner is implied by the authenticated session and never
/// serialized.
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskResponse {
    /// Task ID
    pub id: i64,

    /// Title
    pub title: String,

    /// Description, empty string when none was given
    pub description: String,

    /// Workflow status
    pub status: TaskStatus,

    /// Priority
    pub priority: TaskPriority,

    /// Due date, if any
    pub due_date: Option<NaiveDate>,

    /// Creation time
    pub created_at: DateTime<Utc>,

    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            status: task.status,
            priority: task.priority,
            due_date: task.due_date,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

/// Strips the title and rejects it when nothing remains
fn normalized_title(raw: &str) -> Result<String, ApiError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "title".to_string(),
            message: "Title must not be empty".to_string(),
        }]));
    }
    Ok(title.to_string())
}

/// Builds the 404 for absent or foreign-owned tasks
///
/// The same response covers both cases so ownership is never leaked.
fn task_not_found(id: i64, user_id: i64) -> ApiError {
    tracing::warn!(task_id = id, user_id, "Task not found");
    ApiError::NotFound("Task not found".to_string())
}

/// List tasks handler
///
/// Returns the caller's tasks after applying the query's filters and
/// sort. Filters AND together; `search` matches title and description
/// case-insensitively.
///
/// # Errors
///
/// - `400 Bad Request`: Unknown enum value in a query parameter
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<TaskQuery>,
) -> ApiResult<Json<Vec<TaskResponse>>> {
    let tasks = Task::list_by_owner(&state.db, user.id).await?;
    let tasks = filter_and_sort(tasks, &query);

    tracing::debug!(user_id = user.id, count = tasks.len(), "Listed tasks");

    Ok(Json(tasks.into_iter().map(TaskResponse::from).collect()))
}

/// Create task handler
///
/// # Endpoint
///
/// ```text
/// POST /tasks
/// Content-Type: application/json
///
/// {
///   "title": "Write report",
///   "priority": "high",
///   "due_date": "2024-06-01"
/// }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Empty title or unknown enum value
pub async fn create_task(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    req.validate()?;
    let title = normalized_title(&req.title)?;

    let data = CreateTask {
        title,
        description: req
            .description
            .map(|d| d.trim().to_string())
            .unwrap_or_default(),
        status: req.status.unwrap_or(TaskStatus::Todo),
        priority: req.priority.unwrap_or(TaskPriority::Medium),
        due_date: req.due_date,
    };

    let task = Task::create(&state.db, user.id, data).await?;

    tracing::info!(task_id = task.id, user_id = user.id, "Task created");

    Ok((StatusCode::CREATED, Json(task.into())))
}

/// Task statistics handler
///
/// Aggregates the caller's tasks into counts by status and priority
/// plus a completion rate in `[0, 1]`.
pub async fn task_stats(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> ApiResult<Json<TaskStats>> {
    let tasks = Task::list_by_owner(&state.db, user.id).await?;
    Ok(Json(stats::summarize(&tasks)))
}

/// Get task handler
pub async fn get_task(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<TaskResponse>> {
    let task = Task::find_by_id_and_owner(&state.db, id, user.id)
        .await?
        .ok_or_else(|| task_not_found(id, user.id))?;

    Ok(Json(task.into()))
}

/// Update task handler
///
/// Partial update: only fields present in the body change, and
/// `updated_at` is refreshed. The due date cannot be cleared through
/// this endpoint; omit the field to keep the stored value.
///
/// # Errors
///
/// - `404 Not Found`: No such task owned by the caller
/// - `422 Unprocessable Entity`: Empty title or unknown enum value
pub async fn update_task(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    req.validate()?;

    let mut changes = UpdateTask::default();
    if let Some(raw) = req.title {
        changes.title = Some(normalized_title(&raw)?);
    }
    if let Some(description) = req.description {
        changes.description = Some(description.trim().to_string());
    }
    changes.status = req.status;
    changes.priority = req.priority;
    changes.due_date = req.due_date;

    let task = Task::update(&state.db, id, user.id, changes)
        .await?
        .ok_or_else(|| task_not_found(id, user.id))?;

    tracing::info!(task_id = task.id, user_id = user.id, "Task updated");

    Ok(Json(task.into()))
}

/// Update task status handler
///
/// Narrow mutation: changes `status` and `updated_at`, nothing else.
/// Returns the full updated task.
pub async fn update_task_status(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateStatusRequest>,
) -> ApiResult<Json<TaskResponse>> {
    let task = Task::update_status(&state.db, id, user.id, req.status)
        .await?
        .ok_or_else(|| task_not_found(id, user.id))?;

    tracing::info!(
        task_id = task.id,
        user_id = user.id,
        status = task.status.as_str(),
        "Task status updated"
    );

    Ok(Json(task.into()))
}

/// Delete task handler
///
/// Returns `204 No Content` with an empty body. Deleting a task twice
/// yields 404 on the second call, never a silent success.
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let deleted = Task::delete(&state.db, id, user.id).await?;
    if !deleted {
        return Err(task_not_found(id, user.id));
    }

    tracing::info!(task_id = id, user_id = user.id, "Task deleted");

    Ok(StatusCode::NO_CONTENT)
}
