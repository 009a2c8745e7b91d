//! Logging API routes.
//!
//! Provides endpoints to view and modify the log filter at runtime.

use axum::{Json, Router, extract::State, routing::get};

use crate::api::error::{ApiError, ApiResult};
use crate::api::models::{LoggingConfigResponse, ModuleInfo, UpdateLogFilterRequest};
use crate::api::server::AppState;
use crate::logging::available_modules;

/// Create the logging router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_logging_config).put(update_logging_config))
}

fn config_response(filter: String) -> LoggingConfigResponse {
    LoggingConfigResponse {
        filter,
        available_modules: available_modules()
            .into_iter()
            .map(|(name, description)| ModuleInfo {
                name: name.to_string(),
                description: description.to_string(),
            })
            .collect(),
    }
}

#[utoipa::path(
    get,
    path = "/api/logging",
    tag = "logging",
    responses(
        (status = 200, description = "Current logging configuration", body = LoggingConfigResponse),
        (status = 503, description = "Logging not configured", body = crate::api::error::ApiErrorResponse)
    )
)]
pub async fn get_logging_config(
    State(state): State<AppState>,
) -> ApiResult<Json<LoggingConfigResponse>> {
    let logging_config = state
        .logging_config
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Logging configuration not available"))?;

    Ok(Json(config_response(logging_config.get_filter())))
}

#[utoipa::path(
    put,
    path = "/api/logging",
    tag = "logging",
    request_body = UpdateLogFilterRequest,
    responses(
        (status = 200, description = "Filter updated", body = LoggingConfigResponse),
        (status = 400, description = "Invalid filter directive", body = crate::api::error::ApiErrorResponse)
    )
)]
pub async fn update_logging_config(
    State(state): State<AppState>,
    Json(request): Json<UpdateLogFilterRequest>,
) -> ApiResult<Json<LoggingConfigResponse>> {
    let logging_config = state
        .logging_config
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Logging configuration not available"))?;

    logging_config.set_filter(&request.filter)?;
    Ok(Json(config_response(logging_config.get_filter())))
}
