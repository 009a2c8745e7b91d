//! Live subscriber registry and fan-out.
//!
//! Each subscriber owns a bounded outbound queue drained by its connection
//! task, so a broadcast never waits on a socket. A subscriber whose queue is
//! full misses that notification; nothing is retried.

use axum::extract::ws::Utf8Bytes;
use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, error, trace};
use uuid::Uuid;

use super::model::Notification;
use crate::Result;

/// Outbound messages buffered per subscriber before pushes are dropped.
pub const SUBSCRIBER_QUEUE_CAPACITY: usize = 256;

/// Messages pushed over the live channel.
#[derive(Debug, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum LiveMessage<'a> {
    /// Recent history sent once on connect.
    Init(&'a [Notification]),
    /// A newly stored notification.
    Notification(&'a Notification),
}

impl LiveMessage<'_> {
    pub fn encode(&self) -> Result<Utf8Bytes> {
        Ok(Utf8Bytes::from(serde_json::to_string(self)?))
    }
}

/// A registered subscriber's handle on its outbound queue.
#[derive(Debug)]
pub struct Subscription {
    pub id: Uuid,
    pub receiver: mpsc::Receiver<Utf8Bytes>,
}

/// Set of live subscribers.
#[derive(Debug, Default)]
pub struct Broadcaster {
    subscribers: DashMap<Uuid, mpsc::Sender<Utf8Bytes>>,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber, queueing the `init` snapshot ahead of any
    /// broadcast it will receive.
    pub fn subscribe(&self, snapshot: &[Notification]) -> Result<Subscription> {
        let init = LiveMessage::Init(snapshot).encode()?;
        let (tx, receiver) = mpsc::channel(SUBSCRIBER_QUEUE_CAPACITY);
        // Fresh queue with a live receiver: the first slot is always free.
        let _ = tx.try_send(init);

        let id = Uuid::new_v4();
        self.subscribers.insert(id, tx);
        debug!(subscriber = %id, snapshot = snapshot.len(), "Subscriber registered");
        Ok(Subscription { id, receiver })
    }

    /// Remove a subscriber. Returns whether it was present.
    pub fn remove(&self, id: &Uuid) -> bool {
        let removed = self.subscribers.remove(id).is_some();
        if removed {
            debug!(subscriber = %id, "Subscriber removed");
        }
        removed
    }

    /// Push a notification to every open subscriber.
    ///
    /// Closed subscribers and subscribers with a full queue are skipped;
    /// closed ones leave the set when their connection reports the close.
    /// Returns the number of queues the message was delivered to.
    pub fn broadcast(&self, notification: &Notification) -> usize {
        let payload = match LiveMessage::Notification(notification).encode() {
            Ok(payload) => payload,
            Err(e) => {
                error!(id = %notification.id, error = %e, "Failed to encode notification");
                return 0;
            }
        };

        let mut delivered = 0;
        for entry in self.subscribers.iter() {
            let tx = entry.value();
            if tx.is_closed() {
                trace!(subscriber = %entry.key(), "Skipping closed subscriber");
                continue;
            }
            match tx.try_send(payload.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    debug!(subscriber = %entry.key(), "Subscriber queue full, dropping notification")
                }
                Err(TrySendError::Closed(_)) => {
                    trace!(subscriber = %entry.key(), "Subscriber closed during broadcast")
                }
            }
        }
        delivered
    }

    pub fn count(&self) -> usize {
        self.subscribers.len()
    }
}
