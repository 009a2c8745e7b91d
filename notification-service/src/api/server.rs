//! API server setup and configuration.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use axum::extract::{DefaultBodyLimit, Request};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::Span;

use crate::api::routes;
use crate::config::{KafkaConfig, env_parse, env_string};
use crate::consumer::ConnectionStatus;
use crate::error::Result;
use crate::logging::LoggingConfig;
use crate::notification::NotificationHub;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// Server bind address
    pub bind_address: String,
    /// Server port
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Request body size limit in bytes
    pub body_limit: usize,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 3001,
            enable_cors: true,
            body_limit: 64 * 1024,
        }
    }
}

impl ApiServerConfig {
    /// Load API server config from environment variables, falling back to defaults.
    ///
    /// Supported env vars:
    /// - `API_BIND_ADDRESS` (e.g. "0.0.0.0")
    /// - `API_PORT` or `PORT` (e.g. "3001")
    /// - `API_ENABLE_CORS` (`true` / `false`)
    pub fn from_env_or_default() -> Self {
        let mut config = Self::default();

        if let Some(bind_address) = env_string("API_BIND_ADDRESS") {
            config.bind_address = bind_address;
        }

        if let Some(port) = env_parse::<u16>("API_PORT").or_else(|| env_parse::<u16>("PORT")) {
            config.port = port;
        }

        if let Some(enable_cors) = env_parse::<bool>("API_ENABLE_CORS") {
            config.enable_cors = enable_cors;
        }

        config
    }
}

/// Where the stream consumer points, for status reporting.
#[derive(Debug, Clone, Default)]
pub struct StreamEndpoint {
    pub brokers: Vec<String>,
    pub topics: Vec<String>,
}

impl From<&KafkaConfig> for StreamEndpoint {
    fn from(config: &KafkaConfig) -> Self {
        Self {
            brokers: config.brokers.clone(),
            topics: config.topics.clone(),
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Server start time for uptime calculation
    pub start_time: Instant,
    /// Notification store and live subscribers
    pub hub: Arc<NotificationHub>,
    /// Stream consumer connectivity
    pub stream_status: Arc<ConnectionStatus>,
    /// Stream endpoint reported by `/api/status`
    pub stream_endpoint: StreamEndpoint,
    /// Logging configuration for dynamic log level changes
    pub logging_config: Option<Arc<LoggingConfig>>,
    /// Fires on shutdown so live connections can close
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(hub: Arc<NotificationHub>, stream_status: Arc<ConnectionStatus>) -> Self {
        Self {
            start_time: Instant::now(),
            hub,
            stream_status,
            stream_endpoint: StreamEndpoint::default(),
            logging_config: None,
            shutdown: CancellationToken::new(),
        }
    }

    /// Set the reported stream endpoint.
    pub fn with_stream_endpoint(mut self, endpoint: StreamEndpoint) -> Self {
        self.stream_endpoint = endpoint;
        self
    }

    /// Set the logging configuration.
    pub fn with_logging_config(mut self, config: Arc<LoggingConfig>) -> Self {
        self.logging_config = Some(config);
        self
    }

    /// Use an externally owned shutdown token.
    pub fn with_shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }
}

/// API server.
pub struct ApiServer {
    config: ApiServerConfig,
    state: AppState,
    cancel_token: CancellationToken,
}

impl ApiServer {
    /// Create with the given state. The server stops when the state's
    /// shutdown token is cancelled.
    pub fn with_state(config: ApiServerConfig, state: AppState) -> Self {
        let cancel_token = state.shutdown.clone();
        Self {
            config,
            state,
            cancel_token,
        }
    }

    /// Get the cancellation token for graceful shutdown.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Build the router with all middleware and routes.
    pub fn router(&self) -> Router {
        let mut router = routes::create_router(self.state.clone())
            .layer(DefaultBodyLimit::max(self.config.body_limit));

        // Add CORS if enabled
        if self.config.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            router = router.layer(cors);
        }

        // Add tracing
        router = router.layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request| {
                    if req.uri().path().starts_with("/health") {
                        Span::none()
                    } else {
                        let mut make_span =
                            tower_http::trace::DefaultMakeSpan::new().level(tracing::Level::INFO);
                        use tower_http::trace::MakeSpan;
                        make_span.make_span(req)
                    }
                })
                .on_request(|req: &Request, span: &Span| {
                    if span.is_disabled() || req.uri().path().starts_with("/health") {
                        return;
                    }
                    let mut on_request =
                        tower_http::trace::DefaultOnRequest::new().level(tracing::Level::INFO);
                    use tower_http::trace::OnRequest;
                    on_request.on_request(req, span);
                })
                .on_response(
                    |res: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        if span.is_disabled() {
                            return;
                        }
                        let on_response =
                            tower_http::trace::DefaultOnResponse::new().level(tracing::Level::INFO);
                        use tower_http::trace::OnResponse;
                        on_response.on_response(res, latency, span);
                    },
                )
                .on_failure(
                    |class: tower_http::classify::ServerErrorsFailureClass,
                     latency: Duration,
                     span: &Span| {
                        if span.is_disabled() {
                            return;
                        }
                        let mut on_failure =
                            tower_http::trace::DefaultOnFailure::new().level(tracing::Level::ERROR);
                        use tower_http::trace::OnFailure;
                        on_failure.on_failure(class, latency, span);
                    },
                ),
        );
        router
    }

    /// Bind the configured address and serve until shutdown.
    pub async fn run(&self) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.bind_address, self.config.port)
            .parse()
            .map_err(|e| crate::error::Error::config(format!("Invalid address: {}", e)))?;

        let listener = TcpListener::bind(addr).await?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener until shutdown.
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        let router = self.router();
        let addr = listener.local_addr()?;
        tracing::info!("API server listening on http://{}", addr);
        tracing::info!("Live notifications on ws://{}/ws", addr);

        let cancel_token = self.cancel_token.clone();

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                cancel_token.cancelled().await;
                tracing::info!("API server shutting down...");
            })
            .await
            .map_err(|e| crate::error::Error::Other(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Shutdown the server.
    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}
