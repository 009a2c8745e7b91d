//! Health and status routes.

use axum::{Json, Router, extract::State, routing::get};
use chrono::Utc;

use crate::api::models::{
    HealthResponse, KafkaStatus, StatusResponse, StoreStatus, WebSocketStatus,
};
use crate::api::server::AppState;

const SERVICE_NAME: &str = "notification-service";

/// Create the health router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(health_check))
}

/// Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "UP".to_string(),
        service: SERVICE_NAME.to_string(),
        kafka: state.stream_status.get(),
        timestamp: Utc::now(),
    })
}

/// Diagnostic status endpoint.
#[utoipa::path(
    get,
    path = "/api/status",
    tag = "health",
    responses(
        (status = 200, description = "Service diagnostics", body = StatusResponse)
    )
)]
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let store = state.hub.store();
    let stream_state = state.stream_status.get();

    Json(StatusResponse {
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        kafka: KafkaStatus {
            state: stream_state,
            connected: state.stream_status.is_connected(),
            brokers: state.stream_endpoint.brokers.clone(),
            topics: state.stream_endpoint.topics.clone(),
        },
        websocket: WebSocketStatus {
            clients: state.hub.broadcaster().count(),
        },
        notifications: StoreStatus {
            count: store.count(),
            max_store: store.capacity(),
        },
    })
}
