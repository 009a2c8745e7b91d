//! Relays clinic domain events from Kafka to dashboard clients as
//! notifications, over a REST API and a live WebSocket channel.

pub mod api;
pub mod config;
pub mod consumer;
pub mod error;
pub mod logging;
pub mod notification;

pub use error::{Error, Result};
