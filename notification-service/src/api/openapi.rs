//! OpenAPI documentation configuration.
//!
//! The generated document is served as JSON at `/api/docs/openapi.json`.

use utoipa::OpenApi;

use crate::api::error::ApiErrorResponse;
use crate::api::models::{
    ClearResponse, CountResponse, CreateNotificationRequest, HealthResponse, KafkaStatus,
    LoggingConfigResponse, ModuleInfo, StatusResponse, StoreStatus, UpdateLogFilterRequest,
    WebSocketStatus,
};
use crate::consumer::ConnectionState;
use crate::notification::{EventTypeInfo, Notification, NotificationKind};

/// OpenAPI documentation for the notification service API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "notification-service API",
        version = "0.1.0",
        description = "Relays clinic domain events as user-facing notifications. Live updates are pushed over WebSocket at /ws.",
        license(name = "MIT OR Apache-2.0")
    ),
    servers(
        (url = "http://localhost:3001", description = "Local development server")
    ),
    tags(
        (name = "health", description = "Health and diagnostic endpoints"),
        (name = "notifications", description = "Notification history and manual notifications"),
        (name = "logging", description = "Logging configuration endpoints")
    ),
    paths(
        crate::api::routes::health::health_check,
        crate::api::routes::health::status,
        crate::api::routes::notifications::list_notifications,
        crate::api::routes::notifications::count_notifications,
        crate::api::routes::notifications::create_notification,
        crate::api::routes::notifications::clear_notifications,
        crate::api::routes::notifications::list_event_types,
        crate::api::routes::logging::get_logging_config,
        crate::api::routes::logging::update_logging_config,
    ),
    components(
        schemas(
            Notification,
            NotificationKind,
            EventTypeInfo,
            CreateNotificationRequest,
            CountResponse,
            ClearResponse,
            HealthResponse,
            StatusResponse,
            KafkaStatus,
            WebSocketStatus,
            StoreStatus,
            ConnectionState,
            UpdateLogFilterRequest,
            LoggingConfigResponse,
            ModuleInfo,
            ApiErrorResponse,
        )
    )
)]
pub struct ApiDoc;
