//! Task CRUD routes: one path, one verb per table operation.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::task::{Task, UpsertTask};
use crate::services::task as task_service;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    pub id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResult {
    pub success: bool,
}

/// GET /api/crud?user_id=: all tasks of a user, ordered by id.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Task>>, AppError> {
    let tasks = task_service::list(state.store.as_ref(), params.user_id.as_deref()).await?;
    Ok(Json(tasks))
}

/// POST /api/crud: create a task, or update it when the body carries its id.
pub async fn upsert(
    State(state): State<AppState>,
    body: Result<Json<UpsertTask>, JsonRejection>,
) -> Result<Json<Vec<Task>>, AppError> {
    let Json(body) = body?;
    let rows = task_service::upsert(state.store.as_ref(), body).await?;
    Ok(Json(rows))
}

/// DELETE /api/crud?id=: delete by id; missing rows still report success.
pub async fn delete(
    State(state): State<AppState>,
    Query(params): Query<DeleteParams>,
) -> Result<Json<DeleteResult>, AppError> {
    task_service::delete(state.store.as_ref(), params.id.as_deref()).await?;
    Ok(Json(DeleteResult { success: true }))
}
