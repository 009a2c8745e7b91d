//! Service configuration loaded from environment variables.
//!
//! Every setting has a default, so the service starts with no environment at
//! all. Values that fail to parse are ignored with a warning.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::api::server::ApiServerConfig;
use crate::consumer::retry::RetryConfig;
use crate::notification::DEFAULT_CAPACITY;

/// Default Kafka topics the relay listens on.
pub const DEFAULT_TOPICS: &[&str] = &["pet-events", "appointment-events", "notifications"];

/// Kafka consumer settings.
#[derive(Debug, Clone)]
pub struct KafkaConfig {
    /// Whether to start the stream consumer at all.
    pub enabled: bool,
    pub brokers: Vec<String>,
    pub group_id: String,
    pub client_id: String,
    pub topics: Vec<String>,
    /// Timeout for the broker reachability check, in milliseconds.
    pub connect_timeout_ms: u64,
    /// Backoff for the initial connection.
    pub retry: RetryConfig,
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            brokers: vec!["localhost:9092".to_string()],
            group_id: "notification-group".to_string(),
            client_id: "notification-service".to_string(),
            topics: DEFAULT_TOPICS.iter().map(|t| t.to_string()).collect(),
            connect_timeout_ms: 5000,
            retry: RetryConfig::default(),
        }
    }
}

impl KafkaConfig {
    /// Supported env vars:
    /// - `KAFKA_ENABLED` (`true` / `false`)
    /// - `KAFKA_BOOTSTRAP_SERVERS` (comma separated)
    /// - `KAFKA_GROUP_ID`, `KAFKA_CLIENT_ID`
    /// - `KAFKA_TOPICS` (comma separated)
    /// - `KAFKA_CONNECT_TIMEOUT_MS`, `KAFKA_CONNECT_RETRIES`, `KAFKA_RETRY_INITIAL_MS`
    pub fn from_env_or_default() -> Self {
        let mut config = Self::default();

        if let Some(enabled) = env_parse::<bool>("KAFKA_ENABLED") {
            config.enabled = enabled;
        }
        if let Some(brokers) = env_list("KAFKA_BOOTSTRAP_SERVERS") {
            config.brokers = brokers;
        }
        if let Some(group_id) = env_string("KAFKA_GROUP_ID") {
            config.group_id = group_id;
        }
        if let Some(client_id) = env_string("KAFKA_CLIENT_ID") {
            config.client_id = client_id;
        }
        if let Some(topics) = env_list("KAFKA_TOPICS") {
            config.topics = topics;
        }
        if let Some(timeout) = env_parse("KAFKA_CONNECT_TIMEOUT_MS") {
            config.connect_timeout_ms = timeout;
        }
        if let Some(retries) = env_parse("KAFKA_CONNECT_RETRIES") {
            config.retry.retries = retries;
        }
        if let Some(initial) = env_parse("KAFKA_RETRY_INITIAL_MS") {
            config.retry.initial_delay = Duration::from_millis(initial);
        }

        config
    }

    /// Brokers joined as a bootstrap server list.
    pub fn bootstrap_servers(&self) -> String {
        self.brokers.join(",")
    }
}

/// Top-level service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub api: ApiServerConfig,
    pub kafka: KafkaConfig,
    /// Maximum notifications retained in memory.
    pub store_capacity: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api: ApiServerConfig::default(),
            kafka: KafkaConfig::default(),
            store_capacity: DEFAULT_CAPACITY,
        }
    }
}

impl ServiceConfig {
    /// Load all settings from the environment, falling back to defaults.
    ///
    /// Supported env vars, besides those read by [`ApiServerConfig`] and
    /// [`KafkaConfig`]:
    /// - `NOTIFICATION_CAPACITY`
    pub fn from_env_or_default() -> Self {
        Self {
            api: ApiServerConfig::from_env_or_default(),
            kafka: KafkaConfig::from_env_or_default(),
            store_capacity: env_parse::<usize>("NOTIFICATION_CAPACITY")
                .filter(|capacity| *capacity > 0)
                .unwrap_or(DEFAULT_CAPACITY),
        }
    }

    /// Directory for rolling log files (`LOG_DIR`); console only when unset.
    /// Logging starts before the rest of the configuration is loaded.
    pub fn log_dir_from_env() -> Option<PathBuf> {
        env_string("LOG_DIR").map(PathBuf::from)
    }
}

pub(crate) fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub(crate) fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = env_string(key)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key = %key, value = %raw, "Ignoring invalid environment value");
            None
        }
    }
}

fn env_list(key: &str) -> Option<Vec<String>> {
    let items = split_list(&env_string(key)?);
    (!items.is_empty()).then_some(items)
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
