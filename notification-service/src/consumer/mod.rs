//! Event stream consumer.
//!
//! Connects to the event stream, decodes each message as JSON and hands it to
//! the [`NotificationHub`]. Messages are processed one at a time. A message
//! that fails to decode is logged and dropped; it never stops the loop.
//!
//! If the stream cannot be reached after the configured retries the consumer
//! gives up and the service keeps serving its HTTP API without it.

#[cfg(feature = "kafka")]
pub mod kafka;
pub mod retry;

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use utoipa::ToSchema;

use crate::notification::{NotificationHub, RawEvent};
use crate::{Error, Result};
use retry::RetryConfig;

/// Connectivity of the stream consumer.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema, strum::Display,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Shared view of the consumer's connection state.
#[derive(Debug, Default)]
pub struct ConnectionStatus {
    state: RwLock<ConnectionState>,
}

impl ConnectionStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> ConnectionState {
        *self.state.read()
    }

    pub fn is_connected(&self) -> bool {
        self.get() == ConnectionState::Connected
    }

    fn set(&self, state: ConnectionState) {
        let previous = std::mem::replace(&mut *self.state.write(), state);
        if previous != state {
            debug!(from = %previous, to = %state, "Stream connection state changed");
        }
    }
}

/// A message as delivered by the transport.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: Option<Vec<u8>>,
}

impl InboundMessage {
    pub fn new(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            payload: Some(payload.into()),
        }
    }

    /// Decode the payload as a JSON object.
    pub fn decode(&self) -> Result<RawEvent> {
        let payload = self
            .payload
            .as_deref()
            .ok_or_else(|| Error::decode("empty payload"))?;
        let event: RawEvent =
            serde_json::from_slice(payload).map_err(|e| Error::decode(e.to_string()))?;
        if !event.is_object() {
            return Err(Error::decode("expected a JSON object"));
        }
        Ok(event)
    }
}

/// An open subscription yielding messages in transport order.
#[async_trait]
pub trait MessageSource: Send {
    /// Wait for the next message. `None` means the source has ended.
    async fn recv(&mut self) -> Option<Result<InboundMessage>>;

    /// Tear down the subscription.
    async fn close(&mut self) {}
}

/// Opens subscriptions on the event stream.
#[async_trait]
pub trait StreamConnector: Send + Sync {
    type Source: MessageSource;

    /// Connect and subscribe. Fails with [`Error::TransportUnavailable`].
    async fn connect(&self) -> Result<Self::Source>;

    /// Human-readable endpoint for logs.
    fn describe(&self) -> String;
}

/// Drives one subscription into the hub until cancelled.
pub struct EventConsumer<C> {
    connector: C,
    hub: Arc<NotificationHub>,
    status: Arc<ConnectionStatus>,
    retry: RetryConfig,
}

impl<C: StreamConnector> EventConsumer<C> {
    pub fn new(
        connector: C,
        hub: Arc<NotificationHub>,
        status: Arc<ConnectionStatus>,
        retry: RetryConfig,
    ) -> Self {
        Self {
            connector,
            hub,
            status,
            retry,
        }
    }

    /// Connect, then consume until `cancel_token` fires or the source ends.
    ///
    /// Never fails: an unreachable stream leaves the state `disconnected`.
    pub async fn run(self, cancel_token: CancellationToken) {
        let Some(mut source) = self.connect_with_retry(&cancel_token).await else {
            self.status.set(ConnectionState::Disconnected);
            return;
        };

        self.status.set(ConnectionState::Connected);
        info!(endpoint = %self.connector.describe(), "Stream consumer connected");

        self.consume(&mut source, &cancel_token).await;

        source.close().await;
        self.status.set(ConnectionState::Disconnected);
        info!("Stream consumer stopped");
    }

    async fn connect_with_retry(&self, cancel_token: &CancellationToken) -> Option<C::Source> {
        self.status.set(ConnectionState::Connecting);
        let mut delays = self.retry.delays();
        let mut attempt = 0u32;

        loop {
            let error = match self.connector.connect().await {
                Ok(source) => return Some(source),
                Err(e) => e,
            };
            attempt += 1;

            match delays.next() {
                Some(delay) => {
                    warn!(
                        endpoint = %self.connector.describe(),
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "Stream connection failed, retrying"
                    );
                    tokio::select! {
                        _ = cancel_token.cancelled() => return None,
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
                None => {
                    warn!(
                        endpoint = %self.connector.describe(),
                        attempts = attempt,
                        error = %error,
                        "Stream unavailable, continuing without live events"
                    );
                    return None;
                }
            }
        }
    }

    async fn consume(&self, source: &mut C::Source, cancel_token: &CancellationToken) {
        loop {
            tokio::select! {
                biased;
                _ = cancel_token.cancelled() => break,
                next = source.recv() => match next {
                    Some(Ok(message)) => {
                        if !self.status.is_connected() {
                            info!("Stream consumer recovered");
                            self.status.set(ConnectionState::Connected);
                        }
                        self.process(message);
                    }
                    Some(Err(e)) => {
                        // Report the outage until the transport delivers again.
                        if self.status.is_connected() {
                            warn!(error = %e, "Stream receive failed, awaiting recovery");
                            self.status.set(ConnectionState::Connecting);
                        } else {
                            debug!(error = %e, "Stream receive failed");
                        }
                    }
                    None => {
                        warn!("Stream source ended");
                        break;
                    }
                },
            }
        }
    }

    fn process(&self, message: InboundMessage) {
        match message.decode() {
            Ok(event) => {
                debug!(
                    topic = %message.topic,
                    event_type = event.get("eventType").and_then(|v| v.as_str()).unwrap_or("-"),
                    "Received event"
                );
                self.hub.ingest(&message.topic, event);
            }
            Err(e) => warn!(topic = %message.topic, error = %e, "Dropping undecodable message"),
        }
    }
}
