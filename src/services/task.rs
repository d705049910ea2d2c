//! Task service: field presence checks in front of the task store.

use crate::db::TaskStore;
use crate::errors::AppError;
use crate::models::task::{NewTask, Task, UpsertTask};

pub const MISSING_USER_ID: &str = "Missing user_id";
pub const MISSING_FIELDS: &str = "Missing fields";
pub const MISSING_TASK_ID: &str = "Missing task id";
pub const INVALID_TASK_ID: &str = "Invalid task id";

/// Treat absent and empty values the same way.
fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// List all tasks for a user, ordered by id.
pub async fn list(store: &dyn TaskStore, user_id: Option<&str>) -> Result<Vec<Task>, AppError> {
    let user_id =
        present(user_id).ok_or_else(|| AppError::Validation(MISSING_USER_ID.to_string()))?;
    let tasks = store.list_by_user(user_id).await?;
    tracing::debug!(user_id, count = tasks.len(), "Listed tasks");
    Ok(tasks)
}

/// Check that the required upsert fields are present.
pub fn validate_upsert(body: UpsertTask) -> Result<NewTask, AppError> {
    let missing = || AppError::Validation(MISSING_FIELDS.to_string());

    let user_id = present(body.user_id.as_deref()).ok_or_else(missing)?;
    let task_type = present(body.task_type.as_deref()).ok_or_else(missing)?;
    let content = present(body.content.as_deref()).ok_or_else(missing)?;
    let day = body.day.ok_or_else(missing)?;

    Ok(NewTask {
        id: body.id,
        user_id: user_id.to_string(),
        task_type: task_type.to_string(),
        content: content.to_string(),
        day,
        progress: body.progress,
    })
}

/// Create a task, or update it when the body carries an existing id.
pub async fn upsert(store: &dyn TaskStore, body: UpsertTask) -> Result<Vec<Task>, AppError> {
    let task = validate_upsert(body)?;
    let rows = store.upsert(&task).await?;
    tracing::info!(
        user_id = %task.user_id,
        id = ?rows.first().map(|t| t.id),
        created = task.id.is_none(),
        "Upserted task"
    );
    Ok(rows)
}

/// Parse the `id` query parameter of a delete request.
pub fn parse_task_id(id: Option<&str>) -> Result<i64, AppError> {
    let id = present(id).ok_or_else(|| AppError::Validation(MISSING_TASK_ID.to_string()))?;
    id.trim()
        .parse()
        .map_err(|_| AppError::Validation(INVALID_TASK_ID.to_string()))
}

/// Delete a task by id. Succeeds whether or not the row existed.
pub async fn delete(store: &dyn TaskStore, id: Option<&str>) -> Result<(), AppError> {
    let id = parse_task_id(id)?;
    store.delete(id).await?;
    tracing::info!(id, "Deleted task");
    Ok(())
}
