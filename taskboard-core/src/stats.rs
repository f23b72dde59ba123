//! Aggregate statistics over a user's tasks
//!
//! Backs the dashboard header: total count, per-status and per-priority
//! breakdowns, and the fraction of tasks that are done.

use serde::{Deserialize, Serialize};

use crate::models::task::{Task, TaskPriority, TaskStatus};

/// Task counts keyed by status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub todo: usize,
    pub in_progress: usize,
    pub done: usize,
}

/// Task counts keyed by priority
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityCounts {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

/// Summary of one user's tasks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStats {
    /// Total number of tasks
    pub total: usize,

    /// Breakdown by workflow state
    pub by_status: StatusCounts,

    /// Breakdown by priority
    pub by_priority: PriorityCounts,

    /// Fraction of tasks with status done, in `[0.0, 1.0]`
    ///
    /// `0.0` when there are no tasks at all.
    pub completion_rate: f64,
}

/// Compute statistics for a task list
pub fn summarize(tasks: &[Task]) -> TaskStats {
    let mut by_status = StatusCounts::default();
    let mut by_priority = PriorityCounts::default();

    for task in tasks {
        match task.status {
            TaskStatus::Todo => by_status.todo += 1,
            TaskStatus::InProgress => by_status.in_progress += 1,
            TaskStatus::Done => by_status.done += 1,
        }

        match task.priority {
            TaskPriority::Low => by_priority.low += 1,
            TaskPriority::Medium => by_priority.medium += 1,
            TaskPriority::High => by_priority.high += 1,
        }
    }

    let total = tasks.len();
    let completion_rate = if total == 0 {
        0.0
    } else {
        by_status.done as f64 / total as f64
    };

    TaskStats {
        total,
        by_status,
        by_priority,
        completion_rate,
    }
}
