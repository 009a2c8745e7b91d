//! Notification model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Raw event payload as decoded from the stream.
pub type RawEvent = serde_json::Value;

/// Icon used when a caller does not supply one.
pub const DEFAULT_ICON: &str = "📢";

/// Display severity of a notification.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    #[default]
    Info,
    Warning,
    Error,
}

/// A display-ready notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    /// Unique across the lifetime of the process.
    pub id: Uuid,
    /// Display severity.
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub icon: String,
    pub title: String,
    pub message: String,
    /// When the notification was produced (not when the source event happened).
    pub timestamp: DateTime<Utc>,
    /// The event this notification was derived from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub data: Option<RawEvent>,
}

impl Notification {
    /// Create a notification with a fresh id and the current time.
    pub fn new(
        kind: NotificationKind,
        icon: impl Into<String>,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            icon: icon.into(),
            title: title.into(),
            message: message.into(),
            timestamp: Utc::now(),
            data: None,
        }
    }

    /// Attach the source event.
    pub fn with_source(mut self, event: RawEvent) -> Self {
        self.data = Some(event);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_kind_parsing() {
        assert_eq!(
            NotificationKind::from_str("warning").unwrap(),
            NotificationKind::Warning
        );
        assert!(NotificationKind::from_str("danger").is_err());
        assert_eq!(NotificationKind::default(), NotificationKind::Info);
        assert_eq!(NotificationKind::Success.to_string(), "success");
    }

    #[test]
    fn test_wire_format() {
        let notification = Notification::new(NotificationKind::Error, "🔥", "Boom", "It broke");
        let json = serde_json::to_value(&notification).unwrap();

        assert_eq!(json["type"], "error");
        assert_eq!(json["icon"], "🔥");
        assert_eq!(json["title"], "Boom");
        assert!(json["timestamp"].is_string());
        assert!(json.get("data").is_none());

        let with_source = notification.with_source(serde_json::json!({"eventType": "X"}));
        let json = serde_json::to_value(&with_source).unwrap();
        assert_eq!(json["data"]["eventType"], "X");
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Notification::new(NotificationKind::Info, DEFAULT_ICON, "a", "a");
        let b = Notification::new(NotificationKind::Info, DEFAULT_ICON, "a", "a");
        assert_ne!(a.id, b.id);
    }
}
