//! Filtering and sorting of task lists
//!
//! The task list endpoint fetches a user's tasks in canonical order
//! (newest first) and then shapes the result in memory: exact-match
//! filters on status and priority, a case-insensitive substring search
//! over title and description, and a stable sort on one of four fields.
//!
//! Sorting is stable in both directions. Descending order is produced by
//! flipping the comparator rather than reversing the sorted list, so
//! entries with equal keys always keep their relative input order.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::models::task::{Task, TaskPriority, TaskStatus};

/// Field a task list can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    /// Creation time; defaults to newest first
    #[default]
    CreatedAt,

    /// Due date; defaults to soonest first, tasks without one last
    DueDate,

    /// Priority; defaults to highest first
    Priority,

    /// Title, compared case-insensitively; defaults to A-Z
    Title,
}

impl SortField {
    /// Direction used when the request does not name one
    fn descending_by_default(&self) -> bool {
        matches!(self, SortField::CreatedAt | SortField::Priority)
    }
}

/// Explicit sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Query parameters accepted by the task list endpoint
///
/// Every field is optional; an empty query returns the full list in
/// canonical order.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TaskQuery {
    /// Keep only tasks with this exact status
    pub status: Option<TaskStatus>,

    /// Keep only tasks with this exact priority
    pub priority: Option<TaskPriority>,

    /// Case-insensitive substring match over title and description
    ///
    /// Leading and trailing whitespace is ignored; a blank term disables
    /// the filter entirely.
    pub search: Option<String>,

    /// Sort field, `created_at` when absent
    pub sort_by: SortField,

    /// Sort direction, each field's natural default when absent
    pub order: Option<SortOrder>,
}

/// Apply filters, then sort
///
/// Filters combine with AND. A task whose description is empty can only
/// match a search term through its title.
pub fn filter_and_sort(mut tasks: Vec<Task>, query: &TaskQuery) -> Vec<Task> {
    if let Some(status) = query.status {
        tasks.retain(|task| task.status == status);
    }

    if let Some(priority) = query.priority {
        tasks.retain(|task| task.priority == priority);
    }

    if let Some(needle) = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(str::to_lowercase)
    {
        tasks.retain(|task| {
            task.title.to_lowercase().contains(&needle)
                || task.description.to_lowercase().contains(&needle)
        });
    }

    let descending = match query.order {
        Some(SortOrder::Asc) => false,
        Some(SortOrder::Desc) => true,
        None => query.sort_by.descending_by_default(),
    };

    sort_tasks(&mut tasks, query.sort_by, descending);

    tasks
}

fn sort_tasks(tasks: &mut [Task], field: SortField, descending: bool) {
    let compare = |a: &Task, b: &Task| -> Ordering {
        match field {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::DueDate => due_date_key(a).cmp(&due_date_key(b)),
            SortField::Priority => a.priority.cmp(&b.priority),
            SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        }
    };

    if descending {
        tasks.sort_by(|a, b| compare(b, a));
    } else {
        tasks.sort_by(compare);
    }
}

// Tasks without a due date sort after every dated task in ascending
// order, mirroring a far-future sentinel date.
fn due_date_key(task: &Task) -> NaiveDate {
    task.due_date.unwrap_or(NaiveDate::MAX)
}
