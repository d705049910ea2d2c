//! Route definitions for the tracker API.

pub mod crud;
pub mod dashboard;
pub mod health;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    let origin = match state.config.frontend_url.parse::<HeaderValue>() {
        Ok(origin) => AllowOrigin::exact(origin),
        Err(e) => {
            tracing::warn!(
                error = %e,
                url = %state.config.frontend_url,
                "Invalid FRONTEND_URL, allowing any origin"
            );
            AllowOrigin::any()
        }
    };

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    let body_limit = state.config.body_limit_bytes;

    Router::new()
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .route(
            "/api/crud",
            get(crud::list).post(crud::upsert).delete(crud::delete),
        )
        .route("/api/dashboard/stats", get(dashboard::stats))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
