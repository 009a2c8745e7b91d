//! Notification routes.

use std::str::FromStr;

use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    routing::get,
};

use crate::api::error::{ApiError, ApiResult};
use crate::api::models::{
    ClearResponse, CountResponse, CreateNotificationRequest, ListNotificationsQuery,
};
use crate::api::server::AppState;
use crate::notification::{EventTypeInfo, Notification, NotificationKind, event_type_catalog};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(list_notifications)
                .post(create_notification)
                .delete(clear_notifications),
        )
        .route("/count", get(count_notifications))
        .route("/event-types", get(list_event_types))
}

#[utoipa::path(
    get,
    path = "/api/notifications",
    tag = "notifications",
    params(ListNotificationsQuery),
    responses(
        (status = 200, description = "Most recent notifications, newest first", body = Vec<Notification>)
    )
)]
pub async fn list_notifications(
    State(state): State<AppState>,
    Query(query): Query<ListNotificationsQuery>,
) -> Json<Vec<Notification>> {
    Json(state.hub.store().list(query.effective_limit()))
}

#[utoipa::path(
    get,
    path = "/api/notifications/count",
    tag = "notifications",
    responses(
        (status = 200, description = "Number of stored notifications", body = CountResponse)
    )
)]
pub async fn count_notifications(State(state): State<AppState>) -> Json<CountResponse> {
    Json(CountResponse {
        count: state.hub.store().count(),
    })
}

#[utoipa::path(
    post,
    path = "/api/notifications",
    tag = "notifications",
    request_body = CreateNotificationRequest,
    responses(
        (status = 201, description = "Notification created and broadcast", body = Notification),
        (status = 400, description = "Missing title or message", body = crate::api::error::ApiErrorResponse)
    )
)]
pub async fn create_notification(
    State(state): State<AppState>,
    payload: Result<Json<CreateNotificationRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Notification>)> {
    let Json(request) = payload?;

    let kind = match request.kind.as_deref().map(str::trim) {
        None | Some("") => NotificationKind::default(),
        Some(raw) => NotificationKind::from_str(raw).map_err(|_| {
            ApiError::validation(format!(
                "Unknown notification type '{raw}'; expected success, info, warning or error"
            ))
        })?,
    };

    let notification = state.hub.create(
        kind,
        request.title.as_deref().unwrap_or_default(),
        request.message.as_deref().unwrap_or_default(),
        request.icon.as_deref(),
    )?;

    Ok((StatusCode::CREATED, Json(notification)))
}

#[utoipa::path(
    delete,
    path = "/api/notifications",
    tag = "notifications",
    responses(
        (status = 200, description = "All notifications cleared", body = ClearResponse)
    )
)]
pub async fn clear_notifications(State(state): State<AppState>) -> Json<ClearResponse> {
    state.hub.clear();
    Json(ClearResponse {
        success: true,
        message: "All notifications cleared".to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/api/notifications/event-types",
    tag = "notifications",
    responses(
        (status = 200, description = "Recognised stream event types", body = Vec<EventTypeInfo>)
    )
)]
pub async fn list_event_types() -> Json<Vec<EventTypeInfo>> {
    Json(event_type_catalog())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::consumer::ConnectionStatus;
    use crate::notification::NotificationHub;

    fn app() -> (Router, Arc<NotificationHub>) {
        let hub = Arc::new(NotificationHub::new(100));
        let state = AppState::new(hub.clone(), Arc::new(ConnectionStatus::new()));
        let app = Router::new()
            .nest("/api/notifications", router())
            .with_state(state);
        (app, hub)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/notifications")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_create_returns_201() {
        let (app, hub) = app();
        let response = app
            .oneshot(post(
                r#"{"type": "warning", "title": "Low stock", "message": "Rabies vaccine running low"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["type"], "warning");
        assert_eq!(body["icon"], "📢");
        assert_eq!(body["title"], "Low stock");
        assert_eq!(hub.store().count(), 1);
    }

    #[tokio::test]
    async fn test_create_requires_title_and_message() {
        let (app, hub) = app();

        for body in [
            r#"{"message": "x"}"#,
            r#"{"title": "", "message": "x"}"#,
            r#"{"title": "t"}"#,
        ] {
            let response = app.clone().oneshot(post(body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
            let json = body_json(response).await;
            assert_eq!(json["error"], "Title and message are required");
        }
        assert_eq!(hub.store().count(), 0);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_input() {
        let (app, hub) = app();

        let response = app.clone().oneshot(post("{oops")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["error"].is_string());

        let response = app
            .oneshot(post(r#"{"type": "danger", "title": "t", "message": "m"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(hub.store().count(), 0);
    }

    #[tokio::test]
    async fn test_list_count_and_clear() {
        let (app, hub) = app();
        for i in 1..=60 {
            hub.create(NotificationKind::Info, &format!("n{i}"), "m", None)
                .unwrap();
        }

        let response = app.clone().oneshot(get_req("/api/notifications")).await.unwrap();
        let list = body_json(response).await;
        assert_eq!(list.as_array().unwrap().len(), 50);
        assert_eq!(list[0]["title"], "n60");

        let response = app
            .clone()
            .oneshot(get_req("/api/notifications?limit=3"))
            .await
            .unwrap();
        let titles: Vec<_> = body_json(response)
            .await
            .as_array()
            .unwrap()
            .iter()
            .map(|n| n["title"].clone())
            .collect();
        assert_eq!(titles, vec![json!("n60"), json!("n59"), json!("n58")]);

        for (uri, expected) in [
            ("/api/notifications?limit=0", 50),
            ("/api/notifications?limit=2abc", 2),
            ("/api/notifications?limit=lots", 50),
        ] {
            let response = app.clone().oneshot(get_req(uri)).await.unwrap();
            assert_eq!(body_json(response).await.as_array().unwrap().len(), expected, "{uri}");
        }

        let response = app
            .clone()
            .oneshot(get_req("/api/notifications/count"))
            .await
            .unwrap();
        assert_eq!(body_json(response).await, json!({"count": 60}));

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/notifications")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["success"], true);

        let response = app.oneshot(get_req("/api/notifications")).await.unwrap();
        assert_eq!(body_json(response).await, json!([]));
    }

    #[tokio::test]
    async fn test_event_types() {
        let (app, _hub) = app();
        let response = app
            .oneshot(get_req("/api/notifications/event-types"))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body.as_array().unwrap().len(), 6);
        assert_eq!(body[0]["event_type"], "PET_CREATED");
    }
}
