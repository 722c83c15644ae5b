//! CareHub Server — real-time communication core for the hospital
//! backend.
//!
//! Main entry point that wires the stores, the real-time engine, and the
//! HTTP surface together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use carehub_core::config::AppConfig;
use carehub_core::error::AppError;
use carehub_realtime::connection::authenticator::TokenAuthenticator;
use carehub_realtime::engine::RealtimeEngine;
use carehub_store::{ChatMessageStore, MeetingStore, MemoryChatStore, MemoryMeetingStore};

#[tokio::main]
async fn main() {
    let env = std::env::var("CAREHUB_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt().json().with_env_filter(filter).with_target(true).init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function.
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting CareHub v{}", env!("CARGO_PKG_VERSION"));

    // Standalone mode persists to in-memory stores; the embedded
    // deployment swaps in adapters backed by the hospital document
    // store.
    let chat_store: Arc<dyn ChatMessageStore> = Arc::new(MemoryChatStore::new());
    let meeting_store: Arc<dyn MeetingStore> = Arc::new(MemoryMeetingStore::new());

    let engine = Arc::new(RealtimeEngine::new(
        config.realtime.clone(),
        chat_store,
        meeting_store,
    ));
    let authenticator = Arc::new(TokenAuthenticator::new(&config.auth));

    let state = carehub_api::state::AppState {
        config: Arc::new(config.clone()),
        engine,
        authenticator,
    };

    let app = carehub_api::router::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("CareHub server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    tracing::info!("CareHub server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
