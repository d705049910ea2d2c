//! Dashboard routes: aggregated statistics for the overview page.

use axum::{
    extract::{Query, State},
    Json,
};

use crate::errors::AppError;
use crate::routes::crud::ListParams;
use crate::services::dashboard::{self, DashboardStats};
use crate::AppState;

/// GET /api/dashboard/stats?user_id=: status counts, category averages and
/// calendar cells for a user.
pub async fn stats(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<DashboardStats>, AppError> {
    let stats = dashboard::get_stats(state.store.as_ref(), params.user_id.as_deref()).await?;
    Ok(Json(stats))
}
