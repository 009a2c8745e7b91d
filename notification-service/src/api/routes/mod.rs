//! API route modules.
//!
//! Organizes routes by resource type.

pub mod health;
pub mod live;
pub mod logging;
pub mod notifications;

use axum::{Json, Router, routing::get};
use utoipa::OpenApi;

use crate::api::openapi::ApiDoc;
use crate::api::server::AppState;

/// Create the main API router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/notifications", notifications::router())
        .route("/api/status", get(health::status))
        .nest("/api/logging", logging::router())
        .route("/api/docs/openapi.json", get(openapi_json))
        .nest("/health", health::router())
        .route("/ws", get(live::live_ws))
        .route("/", get(live::live_ws))
        .with_state(state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
