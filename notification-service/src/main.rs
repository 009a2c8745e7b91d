use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use notification_service::api::{ApiServer, AppState, StreamEndpoint};
use notification_service::config::ServiceConfig;
use notification_service::consumer::ConnectionStatus;
use notification_service::logging::init_logging;
use notification_service::notification::NotificationHub;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Keep the guard alive so buffered file logs are flushed on exit
    let (logging_config, _log_guard) =
        init_logging(ServiceConfig::log_dir_from_env().as_deref())?;

    let config = ServiceConfig::from_env_or_default();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        capacity = config.store_capacity,
        "Starting notification service"
    );

    let hub = Arc::new(NotificationHub::new(config.store_capacity));
    let stream_status = Arc::new(ConnectionStatus::new());
    let shutdown = CancellationToken::new();

    let consumer_handle = spawn_consumer(&config, &hub, &stream_status, &shutdown);

    let state = AppState::new(hub.clone(), stream_status)
        .with_stream_endpoint(StreamEndpoint::from(&config.kafka))
        .with_logging_config(logging_config)
        .with_shutdown(shutdown.clone());

    hub.announce_startup();

    tokio::spawn(wait_for_signal(shutdown.clone()));

    let server = ApiServer::with_state(config.api.clone(), state);
    let result = server.run().await;

    // Stop the consumer even when the server failed to start
    shutdown.cancel();
    if let Some(handle) = consumer_handle
        && let Err(e) = handle.await
    {
        warn!(error = %e, "Consumer task ended abnormally");
    }

    result?;
    info!("Notification service stopped");
    Ok(())
}

#[cfg(feature = "kafka")]
fn spawn_consumer(
    config: &ServiceConfig,
    hub: &Arc<NotificationHub>,
    status: &Arc<ConnectionStatus>,
    shutdown: &CancellationToken,
) -> Option<tokio::task::JoinHandle<()>> {
    use notification_service::consumer::EventConsumer;
    use notification_service::consumer::kafka::KafkaConnector;

    if !config.kafka.enabled {
        warn!("Kafka consumer disabled; only manual notifications will be relayed");
        return None;
    }

    let consumer = EventConsumer::new(
        KafkaConnector::new(config.kafka.clone()),
        hub.clone(),
        status.clone(),
        config.kafka.retry.clone(),
    );
    Some(tokio::spawn(consumer.run(shutdown.clone())))
}

#[cfg(not(feature = "kafka"))]
fn spawn_consumer(
    _config: &ServiceConfig,
    _hub: &Arc<NotificationHub>,
    _status: &Arc<ConnectionStatus>,
    _shutdown: &CancellationToken,
) -> Option<tokio::task::JoinHandle<()>> {
    warn!("Built without the kafka feature; only manual notifications will be relayed");
    None
}

async fn wait_for_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }

    shutdown.cancel();
}
