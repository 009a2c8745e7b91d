//! Notification pipeline.
//!
//! Stream events are normalized into [`Notification`]s, kept in a bounded
//! newest-first [`NotificationStore`], and fanned out to live WebSocket
//! subscribers by the [`Broadcaster`]. [`NotificationHub`] ties these
//! together and is the only state shared between the stream consumer and
//! the API.
//!
//! # Example
//!
//! ```ignore
//! use notification_service::notification::{NotificationHub, NotificationKind};
//!
//! let hub = NotificationHub::new(100);
//! let created = hub.create(NotificationKind::Info, "Clinic", "Doors open at 8", None)?;
//! assert_eq!(hub.store().list(1)[0].id, created.id);
//! ```

pub mod broadcaster;
pub mod events;
pub mod hub;
pub mod model;
pub mod normalizer;
pub mod store;

pub use broadcaster::{Broadcaster, LiveMessage, SUBSCRIBER_QUEUE_CAPACITY, Subscription};
pub use events::{DomainEventType, EventTypeInfo, event_type_catalog};
pub use hub::{INIT_SNAPSHOT_SIZE, NotificationHub};
pub use model::{DEFAULT_ICON, Notification, NotificationKind, RawEvent};
pub use store::{DEFAULT_CAPACITY, DEFAULT_LIST_LIMIT, NotificationStore};
