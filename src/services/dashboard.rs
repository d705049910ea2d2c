//! Dashboard aggregation: pure projections over a user's task list.
//!
//! Everything here is recomputed from the canonical list on demand. The
//! server exposes it through the stats endpoint and the client view uses the
//! same functions for rendering, layering its session-only skip days on top.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::db::TaskStore;
use crate::errors::AppError;
use crate::models::task::{Category, Task, TaskStatus, DAYS_IN_MONTH, PROGRESS_COMPLETE};
use crate::services::task as task_service;

/// Aggregated dashboard statistics for one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub status_counts: StatusCounts,
    pub categories: Vec<CategoryProgress>,
    pub days: Vec<DayCell>,
}

/// Task counts grouped by derived status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub not_ready: usize,
    pub in_process: usize,
    pub success: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.not_ready + self.in_process + self.success
    }
}

/// Rounded average progress of one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryProgress {
    pub category: Category,
    pub label: &'static str,
    pub average: i32,
}

/// Display color of a calendar cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DayColor {
    Empty,
    NotReady,
    InProcess,
    Success,
    Skipped,
}

impl DayColor {
    pub fn for_status(status: TaskStatus) -> Self {
        match status {
            TaskStatus::NotReady => DayColor::NotReady,
            TaskStatus::InProcess => DayColor::InProcess,
            TaskStatus::Success => DayColor::Success,
        }
    }
}

/// One calendar slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayCell {
    pub day: i32,
    pub task_count: usize,
    pub max_progress: Option<i32>,
    pub color: DayColor,
    /// At least one task of the day is complete and the day isn't skipped.
    pub completed: bool,
}

/// Split tasks into the fixed calendar buckets. Index `i` holds day `i + 1`;
/// tasks outside the calendar range are dropped.
pub fn tasks_by_day(tasks: &[Task]) -> Vec<Vec<&Task>> {
    (1..=DAYS_IN_MONTH)
        .map(|day| tasks.iter().filter(|t| t.day == day).collect())
        .collect()
}

pub fn status_counts(tasks: &[Task]) -> StatusCounts {
    tasks
        .iter()
        .fold(StatusCounts::default(), |mut counts, t| {
            match t.status() {
                TaskStatus::NotReady => counts.not_ready += 1,
                TaskStatus::InProcess => counts.in_process += 1,
                TaskStatus::Success => counts.success += 1,
            }
            counts
        })
}

/// Mean progress of a category rounded half up, 0 when it has no tasks.
pub fn average_progress(tasks: &[Task], category: Category) -> i32 {
    let (sum, count) = tasks
        .iter()
        .filter(|t| t.category() == Some(category))
        .fold((0i64, 0i64), |(sum, count), t| {
            (sum + i64::from(t.progress), count + 1)
        });
    if count == 0 {
        return 0;
    }
    (sum as f64 / count as f64 + 0.5).floor() as i32
}

pub fn category_progress(tasks: &[Task]) -> Vec<CategoryProgress> {
    Category::ALL
        .into_iter()
        .map(|category| CategoryProgress {
            category,
            label: category.label(),
            average: average_progress(tasks, category),
        })
        .collect()
}

/// Cell color from the day's tasks; a skipped day overrides everything.
pub fn day_color(day_tasks: &[&Task], skipped: bool) -> DayColor {
    if skipped {
        return DayColor::Skipped;
    }
    match day_tasks.iter().map(|t| t.progress).max() {
        Some(max) => DayColor::for_status(TaskStatus::from_progress(max)),
        None => DayColor::Empty,
    }
}

pub fn calendar(tasks: &[Task], skipped_days: &BTreeSet<i32>) -> Vec<DayCell> {
    tasks_by_day(tasks)
        .into_iter()
        .zip(1..=DAYS_IN_MONTH)
        .map(|(day_tasks, day)| {
            let skipped = skipped_days.contains(&day);
            DayCell {
                day,
                task_count: day_tasks.len(),
                max_progress: day_tasks.iter().map(|t| t.progress).max(),
                color: day_color(&day_tasks, skipped),
                completed: !skipped && day_tasks.iter().any(|t| t.progress == PROGRESS_COMPLETE),
            }
        })
        .collect()
}

pub fn build_stats(tasks: &[Task], skipped_days: &BTreeSet<i32>) -> DashboardStats {
    DashboardStats {
        status_counts: status_counts(tasks),
        categories: category_progress(tasks),
        days: calendar(tasks, skipped_days),
    }
}

/// Load a user's tasks and project them into dashboard statistics.
pub async fn get_stats(
    store: &dyn TaskStore,
    user_id: Option<&str>,
) -> Result<DashboardStats, AppError> {
    let tasks = task_service::list(store, user_id).await?;
    Ok(build_stats(&tasks, &BTreeSet::new()))
}
