//! Maps raw stream events to display notifications.

use serde_json::Value;
use tracing::debug;

use super::events::{DomainEventType, GENERIC_PRESENTATION};
use super::model::{Notification, RawEvent};

/// Placeholder rendered for missing template fields.
const MISSING_FIELD: &str = "unknown";

/// Normalize a decoded event received on `topic`.
///
/// Returns `None` only when the event is not an object or carries no string
/// `eventType`. Unrecognised event types become a generic info notification.
pub fn normalize(topic: &str, event: RawEvent) -> Option<Notification> {
    let event_type = event.as_object()?.get("eventType")?.as_str()?.to_string();
    debug!(topic = %topic, event_type = %event_type, "Normalizing event");

    let notification = match DomainEventType::from_tag(&event_type) {
        Some(known) => {
            let presentation = known.presentation();
            Notification::new(
                presentation.kind,
                presentation.icon,
                presentation.title,
                render_message(known, &event),
            )
        }
        None => Notification::new(
            GENERIC_PRESENTATION.kind,
            GENERIC_PRESENTATION.icon,
            GENERIC_PRESENTATION.title,
            format!("Event received: {event_type}"),
        ),
    };

    Some(notification.with_source(event))
}

fn render_message(event_type: DomainEventType, event: &Value) -> String {
    let field = |name: &str| field_text(event, name);

    match event_type {
        DomainEventType::PetCreated => format!(
            "{} ({}) has been registered!",
            field("petName"),
            field("species")
        ),
        DomainEventType::PetUpdated => {
            format!("{}'s information has been updated.", field("petName"))
        }
        DomainEventType::PetDeleted => {
            format!("Pet #{} has been removed from the system.", field("petId"))
        }
        DomainEventType::AppointmentCreated => format!(
            "New {} appointment booked for {} at {}",
            field("type"),
            field("date"),
            field("time")
        ),
        DomainEventType::AppointmentUpdated => {
            format!("Appointment #{} has been modified.", field("appointmentId"))
        }
        DomainEventType::AppointmentDeleted => {
            format!("Appointment #{} has been cancelled.", field("appointmentId"))
        }
    }
}

fn field_text(event: &Value, name: &str) -> String {
    match event.get(name) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => MISSING_FIELD.to_string(),
        Some(other) => other.to_string(),
    }
}
