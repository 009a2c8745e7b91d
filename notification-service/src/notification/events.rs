//! Domain events understood by the relay.
//!
//! The pet and appointment services publish JSON objects tagged with an
//! `eventType`. Each recognised type has a fixed presentation; anything else
//! is shown as a generic system event.

use serde::Serialize;
use utoipa::ToSchema;

use super::model::{DEFAULT_ICON, NotificationKind};

/// Recognised domain event types.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DomainEventType {
    PetCreated,
    PetUpdated,
    PetDeleted,
    AppointmentCreated,
    AppointmentUpdated,
    AppointmentDeleted,
}

/// Fixed presentation of an event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presentation {
    pub kind: NotificationKind,
    pub icon: &'static str,
    pub title: &'static str,
}

/// Presentation used for event types outside [`DomainEventType`].
pub const GENERIC_PRESENTATION: Presentation = Presentation {
    kind: NotificationKind::Info,
    icon: DEFAULT_ICON,
    title: "System Event",
};

impl DomainEventType {
    /// Look up a recognised event type by its wire tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        tag.parse().ok()
    }

    pub fn presentation(self) -> Presentation {
        match self {
            Self::PetCreated => Presentation {
                kind: NotificationKind::Success,
                icon: "🐾",
                title: "New Pet Registered",
            },
            Self::PetUpdated => Presentation {
                kind: NotificationKind::Info,
                icon: "📝",
                title: "Pet Updated",
            },
            Self::PetDeleted => Presentation {
                kind: NotificationKind::Warning,
                icon: "🗑️",
                title: "Pet Removed",
            },
            Self::AppointmentCreated => Presentation {
                kind: NotificationKind::Success,
                icon: "📅",
                title: "Appointment Scheduled",
            },
            Self::AppointmentUpdated => Presentation {
                kind: NotificationKind::Info,
                icon: "🔄",
                title: "Appointment Updated",
            },
            Self::AppointmentDeleted => Presentation {
                kind: NotificationKind::Warning,
                icon: "❌",
                title: "Appointment Cancelled",
            },
        }
    }
}

/// Static metadata about a recognised event type, for API consumers.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EventTypeInfo {
    /// Wire tag (`eventType` value).
    pub event_type: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub icon: String,
    pub title: String,
}

pub fn event_type_catalog() -> Vec<EventTypeInfo> {
    use strum::IntoEnumIterator;

    DomainEventType::iter()
        .map(|event_type| {
            let presentation = event_type.presentation();
            EventTypeInfo {
                event_type: event_type.to_string(),
                kind: presentation.kind,
                icon: presentation.icon.to_string(),
                title: presentation.title.to_string(),
            }
        })
        .collect()
}
