//! Shared notification state.
//!
//! [`NotificationHub`] owns the store and the subscriber registry. One hub is
//! built at startup and handed by `Arc` to both the stream consumer and the
//! HTTP handlers.

use parking_lot::Mutex;
use tracing::{debug, info};

use super::broadcaster::{Broadcaster, Subscription};
use super::model::{DEFAULT_ICON, Notification, NotificationKind, RawEvent};
use super::normalizer;
use super::store::NotificationStore;
use crate::{Error, Result};

/// Number of notifications sent to a subscriber on connect.
pub const INIT_SNAPSHOT_SIZE: usize = 10;

pub struct NotificationHub {
    store: NotificationStore,
    broadcaster: Broadcaster,
    /// Orders store insertion, fan-out and subscriber registration so every
    /// subscriber sees notifications in store order, with no gap or overlap
    /// between its snapshot and its first push.
    publish_lock: Mutex<()>,
}

impl NotificationHub {
    pub fn new(capacity: usize) -> Self {
        Self {
            store: NotificationStore::new(capacity),
            broadcaster: Broadcaster::new(),
            publish_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &NotificationStore {
        &self.store
    }

    pub fn broadcaster(&self) -> &Broadcaster {
        &self.broadcaster
    }

    /// Store a notification and push it to every live subscriber.
    pub fn publish(&self, notification: Notification) {
        let _guard = self.publish_lock.lock();
        self.store.append(notification.clone());
        let delivered = self.broadcaster.broadcast(&notification);
        debug!(
            id = %notification.id,
            kind = %notification.kind,
            delivered,
            "Notification published"
        );
    }

    /// Normalize a stream event and publish the result, if any.
    pub fn ingest(&self, topic: &str, event: RawEvent) -> Option<Notification> {
        let Some(notification) = normalizer::normalize(topic, event) else {
            debug!(topic = %topic, "Event has no usable eventType, skipping");
            return None;
        };
        self.publish(notification.clone());
        Some(notification)
    }

    /// Create and publish a notification supplied directly by a caller.
    ///
    /// `title` and `message` must be non-blank; otherwise nothing is stored.
    pub fn create(
        &self,
        kind: NotificationKind,
        title: &str,
        message: &str,
        icon: Option<&str>,
    ) -> Result<Notification> {
        if title.trim().is_empty() || message.trim().is_empty() {
            return Err(Error::validation("Title and message are required"));
        }

        let icon = icon
            .map(str::trim)
            .filter(|icon| !icon.is_empty())
            .unwrap_or(DEFAULT_ICON);
        let notification = Notification::new(kind, icon, title, message);
        self.publish(notification.clone());
        Ok(notification)
    }

    /// Register a live subscriber and queue its recent-history snapshot.
    pub fn connect(&self) -> Result<Subscription> {
        let _guard = self.publish_lock.lock();
        let snapshot = self.store.list(INIT_SNAPSHOT_SIZE);
        self.broadcaster.subscribe(&snapshot)
    }

    pub fn disconnect(&self, subscription_id: &uuid::Uuid) {
        self.broadcaster.remove(subscription_id);
    }

    /// Record the startup notice. It is stored but not pushed, since no
    /// client can be connected yet.
    pub fn announce_startup(&self) {
        self.store.append(Notification::new(
            NotificationKind::Success,
            "🚀",
            "Service Started",
            "Notification service is now online and ready!",
        ));
        info!("Startup notification recorded");
    }

    pub fn clear(&self) {
        let _guard = self.publish_lock.lock();
        self.store.clear();
        info!("Notification store cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn drain(subscription: &mut Subscription) -> Vec<Value> {
        let mut out = Vec::new();
        while let Ok(payload) = subscription.receiver.try_recv() {
            out.push(serde_json::from_str(payload.as_str()).unwrap());
        }
        out
    }

    #[test]
    fn test_create_rejects_blank_fields() {
        let hub = NotificationHub::new(10);
        let err = hub
            .create(NotificationKind::Info, "", "x", None)
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(hub.create(NotificationKind::Info, "t", "   ", None).is_err());
        assert_eq!(hub.store().count(), 0);
    }

    #[test]
    fn test_create_stores_and_broadcasts() {
        let hub = NotificationHub::new(10);
        let mut sub = hub.connect().unwrap();

        let created = hub
            .create(NotificationKind::Warning, "Heads up", "Kennel 3 is full", Some("🐕"))
            .unwrap();
        assert_eq!(created.icon, "🐕");
        assert!(created.data.is_none());
        assert_eq!(hub.store().list(1), vec![created.clone()]);

        let messages = drain(&mut sub);
        assert_eq!(messages[1]["type"], "notification");
        assert_eq!(messages[1]["data"]["id"], created.id.to_string());
    }

    #[test]
    fn test_create_defaults_icon() {
        let hub = NotificationHub::new(10);
        let created = hub
            .create(NotificationKind::Info, "t", "m", Some(" "))
            .unwrap();
        assert_eq!(created.icon, DEFAULT_ICON);
    }

    #[test]
    fn test_snapshot_on_connect_holds_ten_most_recent() {
        let hub = NotificationHub::new(100);
        for i in 1..=15 {
            hub.publish(Notification::new(
                NotificationKind::Info,
                DEFAULT_ICON,
                format!("n{i}"),
                "m",
            ));
        }

        let mut sub = hub.connect().unwrap();
        let messages = drain(&mut sub);
        assert_eq!(messages.len(), 1);
        let titles: Vec<_> = messages[0]["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|n| n["title"].as_str().unwrap().to_string())
            .collect();
        let expected: Vec<_> = (6..=15).rev().map(|i| format!("n{i}")).collect();
        assert_eq!(titles, expected);
    }

    #[test]
    fn test_concurrent_connects_see_no_gap_or_overlap() {
        const PUBLISHED: usize = 200;
        const CLIENTS: usize = 8;

        let hub = NotificationHub::new(PUBLISHED);
        let seq = |message: &Value| -> usize { message["title"].as_str().unwrap().parse().unwrap() };

        let mut subscriptions = std::thread::scope(|scope| {
            scope.spawn(|| {
                for i in 0..PUBLISHED {
                    hub.publish(Notification::new(
                        NotificationKind::Info,
                        DEFAULT_ICON,
                        i.to_string(),
                        "m",
                    ));
                }
            });
            let clients: Vec<_> = (0..CLIENTS)
                .map(|c| {
                    let hub = &hub;
                    scope.spawn(move || {
                        std::thread::sleep(std::time::Duration::from_micros(50 * c as u64));
                        hub.connect().unwrap()
                    })
                })
                .collect();
            clients
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .collect::<Vec<_>>()
        });

        for sub in &mut subscriptions {
            let messages = drain(sub);
            assert_eq!(messages[0]["type"], "init");
            let init: Vec<usize> = messages[0]["data"]
                .as_array()
                .unwrap()
                .iter()
                .map(seq)
                .collect();
            let pushed: Vec<usize> = messages[1..]
                .iter()
                .map(|m| {
                    assert_eq!(m["type"], "notification");
                    seq(&m["data"])
                })
                .collect();

            // The snapshot is the newest run of history, newest first.
            let next = init.first().map_or(0, |newest| newest + 1);
            let expected_init: Vec<usize> = (next.saturating_sub(INIT_SNAPSHOT_SIZE)..next).rev().collect();
            assert_eq!(init, expected_init);

            // Pushes resume exactly after the snapshot.
            let expected_pushed: Vec<usize> = (next..PUBLISHED).collect();
            assert_eq!(pushed, expected_pushed);
        }
    }

    #[test]
    fn test_ingest_publishes_normalized_events() {
        let hub = NotificationHub::new(10);
        let published = hub
            .ingest("pet-events", json!({"eventType": "PET_DELETED", "petId": 4}))
            .unwrap();
        assert_eq!(published.title, "Pet Removed");
        assert_eq!(hub.store().count(), 1);

        assert!(hub.ingest("pet-events", json!({"petId": 4})).is_none());
        assert_eq!(hub.store().count(), 1);
    }

    #[test]
    fn test_redelivery_is_not_deduplicated() {
        let hub = NotificationHub::new(10);
        let event = json!({"eventType": "APPOINTMENT_UPDATED", "appointmentId": 9});
        let a = hub.ingest("appointment-events", event.clone()).unwrap();
        let b = hub.ingest("appointment-events", event).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(hub.store().count(), 2);
    }

    #[test]
    fn test_disconnect_is_idempotent() {
        let hub = NotificationHub::new(10);
        let sub = hub.connect().unwrap();
        assert_eq!(hub.broadcaster().count(), 1);
        hub.disconnect(&sub.id);
        hub.disconnect(&sub.id);
        assert_eq!(hub.broadcaster().count(), 0);
    }

    #[test]
    fn test_startup_notice_and_clear() {
        let hub = NotificationHub::new(10);
        hub.announce_startup();
        assert_eq!(hub.store().list(1)[0].title, "Service Started");

        hub.clear();
        assert_eq!(hub.store().count(), 0);
        hub.create(NotificationKind::Info, "after", "clear", None)
            .unwrap();
        assert_eq!(hub.store().count(), 1);
    }
}
