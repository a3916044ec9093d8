//! Application startup and lifecycle management.
//!
//! Builds the history store and text provider from configuration, injects
//! them into the router state, and serves HTTP until a shutdown signal.

use crate::config::{ChatConfig, HistoryBackend, ProviderKind};
use crate::handlers;
use crate::services::providers::{BedrockTextProvider, MockTextProvider, TextProvider};
use crate::services::{HistoryStore, InMemoryHistoryStore, MongoHistoryStore};
use axum::{
    http::Request,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{request_id_middleware, REQUEST_ID_HEADER};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

/// Shared application state: the two external collaborators.
#[derive(Clone)]
pub struct AppState {
    pub history: Arc<dyn HistoryStore>,
    pub text_provider: Arc<dyn TextProvider>,
}

impl AppState {
    pub fn new(history: Arc<dyn HistoryStore>, text_provider: Arc<dyn TextProvider>) -> Self {
        Self {
            history,
            text_provider,
        }
    }
}

/// Build the HTTP router over the given state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/chat", post(handlers::chat))
        .route("/history", get(handlers::get_history))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                    user_id = tracing::field::Empty,
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Construct the history store selected by configuration.
async fn build_history_store(config: &ChatConfig) -> Result<Arc<dyn HistoryStore>, AppError> {
    match config.history.backend {
        HistoryBackend::Mongodb => {
            let mongo = config.history.mongodb.as_ref().ok_or_else(|| {
                AppError::ConfigError(anyhow::anyhow!("MongoDB settings are missing"))
            })?;

            let store = MongoHistoryStore::connect(mongo).await?;
            store.initialize_indexes().await.map_err(|e| {
                tracing::error!("Failed to initialize database indexes: {}", e);
                e
            })?;
            Ok(Arc::new(store))
        }
        HistoryBackend::Memory => {
            tracing::warn!("Using in-memory history store; history is lost on restart");
            Ok(Arc::new(InMemoryHistoryStore::new()))
        }
    }
}

/// Construct the text provider selected by configuration.
fn build_text_provider(config: &ChatConfig) -> Result<Arc<dyn TextProvider>, AppError> {
    match config.genai.provider {
        ProviderKind::Bedrock => {
            let bedrock = config.genai.bedrock.clone().ok_or_else(|| {
                AppError::ConfigError(anyhow::anyhow!("Bedrock settings are missing"))
            })?;
            let provider = BedrockTextProvider::new(bedrock)?;
            tracing::info!(model = %provider.model_id(), "Initialized Bedrock text provider");
            Ok(Arc::new(provider))
        }
        ProviderKind::Mock => {
            tracing::warn!("Using mock text provider");
            Ok(Arc::new(MockTextProvider::new()))
        }
    }
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: ChatConfig) -> Result<Self, AppError> {
        let history = build_history_store(&config).await?;
        let text_provider = build_text_provider(&config)?;

        Self::with_state(config.common.port, AppState::new(history, text_provider)).await
    }

    /// Bind the listener and wire an already-built state (port 0 = random port).
    pub async fn with_state(port: u16, state: AppState) -> Result<Self, AppError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Chat service: HTTP on port {}", port);

        Ok(Self {
            port,
            listener,
            router: build_router(state),
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until a shutdown signal arrives.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                e
            })
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
