//! API request and response types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::consumer::ConnectionState;
use crate::notification::DEFAULT_LIST_LIMIT;

/// Query parameters for listing notifications.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListNotificationsQuery {
    /// Maximum number of notifications to return (default 50).
    /// Only the leading digits count (`10abc` is 10); a missing, zero or
    /// non-numeric value means the default.
    pub limit: Option<String>,
}

impl ListNotificationsQuery {
    pub fn effective_limit(&self) -> usize {
        let Some(raw) = self.limit.as_deref() else {
            return DEFAULT_LIST_LIMIT;
        };
        let unsigned = raw.trim_start();
        let unsigned = unsigned.strip_prefix('+').unwrap_or(unsigned);
        let end = unsigned
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(unsigned.len());
        let digits = &unsigned[..end];

        if digits.is_empty() {
            return DEFAULT_LIST_LIMIT;
        }
        // Too many digits for usize still means "everything".
        match digits.parse::<usize>().unwrap_or(usize::MAX) {
            0 => DEFAULT_LIST_LIMIT,
            limit => limit,
        }
    }
}

/// Request to create a notification directly.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateNotificationRequest {
    /// One of `success`, `info`, `warning`, `error` (default `info`).
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub title: Option<String>,
    pub message: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CountResponse {
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClearResponse {
    pub success: bool,
    pub message: String,
}

/// Liveness response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always `UP` when the service answers.
    pub status: String,
    pub service: String,
    /// Stream connection state.
    pub kafka: ConnectionState,
    pub timestamp: DateTime<Utc>,
}

/// Diagnostic snapshot of the service.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    pub service: String,
    pub version: String,
    pub uptime_secs: u64,
    pub kafka: KafkaStatus,
    pub websocket: WebSocketStatus,
    pub notifications: StoreStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct KafkaStatus {
    pub state: ConnectionState,
    pub connected: bool,
    pub brokers: Vec<String>,
    pub topics: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WebSocketStatus {
    /// Live subscribers currently registered.
    pub clients: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StoreStatus {
    pub count: usize,
    pub max_store: usize,
}

/// Request to update the log filter.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateLogFilterRequest {
    pub filter: String,
}

/// Response for logging configuration.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoggingConfigResponse {
    pub filter: String,
    pub available_modules: Vec<ModuleInfo>,
}

/// Information about an available logging module.
#[derive(Debug, Serialize, ToSchema)]
pub struct ModuleInfo {
    pub name: String,
    pub description: String,
}
