//! Kafka transport for the event consumer.

use std::time::Duration;

use async_trait::async_trait;
use rdkafka::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::Message;
use tracing::{debug, info};

use super::{InboundMessage, MessageSource, StreamConnector};
use crate::config::KafkaConfig;
use crate::{Error, Result};

/// Connects to Kafka as a member of the configured consumer group.
pub struct KafkaConnector {
    config: KafkaConfig,
}

impl KafkaConnector {
    pub fn new(config: KafkaConfig) -> Self {
        Self { config }
    }

    fn client_config(&self) -> ClientConfig {
        let mut client = ClientConfig::new();
        client
            .set("bootstrap.servers", self.config.bootstrap_servers())
            .set("group.id", &self.config.group_id)
            .set("client.id", &self.config.client_id)
            .set("enable.auto.commit", "true")
            // Only events published while the relay is running are of interest.
            .set("auto.offset.reset", "latest");
        client
    }
}

#[async_trait]
impl StreamConnector for KafkaConnector {
    type Source = KafkaSource;

    async fn connect(&self) -> Result<KafkaSource> {
        let consumer: StreamConsumer = self
            .client_config()
            .create()
            .map_err(|e| Error::transport(format!("failed to create consumer: {e}")))?;

        // Creating a consumer does not touch the network; a metadata fetch
        // tells us whether any broker answers.
        let timeout = Duration::from_millis(self.config.connect_timeout_ms);
        let consumer = tokio::task::spawn_blocking(move || {
            let probe = consumer.fetch_metadata(None, timeout);
            probe.map(|metadata| {
                debug!(brokers = metadata.brokers().len(), "Kafka metadata fetched");
                consumer
            })
        })
        .await
        .map_err(|e| Error::transport(format!("metadata probe aborted: {e}")))?
        .map_err(|e| Error::transport(format!("brokers unreachable: {e}")))?;

        let topics: Vec<&str> = self.config.topics.iter().map(String::as_str).collect();
        consumer
            .subscribe(&topics)
            .map_err(|e| Error::transport(format!("failed to subscribe: {e}")))?;

        info!(
            brokers = %self.config.bootstrap_servers(),
            group_id = %self.config.group_id,
            topics = ?self.config.topics,
            "Subscribed to Kafka topics"
        );
        Ok(KafkaSource { consumer })
    }

    fn describe(&self) -> String {
        self.config.bootstrap_servers()
    }
}

/// An active Kafka subscription.
pub struct KafkaSource {
    consumer: StreamConsumer,
}

#[async_trait]
impl MessageSource for KafkaSource {
    async fn recv(&mut self) -> Option<Result<InboundMessage>> {
        let next = match self.consumer.recv().await {
            Ok(message) => Ok(InboundMessage {
                topic: message.topic().to_string(),
                payload: message.payload().map(<[u8]>::to_vec),
            }),
            Err(e) => Err(Error::transport(e.to_string())),
        };
        Some(next)
    }

    async fn close(&mut self) {
        self.consumer.unsubscribe();
        info!("Kafka subscription closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_carries_group_identity() {
        let connector = KafkaConnector::new(KafkaConfig {
            brokers: vec!["kafka-1:9092".to_string(), "kafka-2:9092".to_string()],
            ..KafkaConfig::default()
        });
        let client = connector.client_config();

        assert_eq!(client.get("bootstrap.servers"), Some("kafka-1:9092,kafka-2:9092"));
        assert_eq!(client.get("group.id"), Some("notification-group"));
        assert_eq!(client.get("client.id"), Some("notification-service"));
        assert_eq!(client.get("auto.offset.reset"), Some("latest"));
        assert_eq!(connector.describe(), "kafka-1:9092,kafka-2:9092");
    }
}
