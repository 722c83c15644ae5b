//! Application state shared across all handlers.

use std::sync::Arc;

use carehub_core::config::AppConfig;
use carehub_realtime::connection::authenticator::TokenAuthenticator;
use carehub_realtime::engine::RealtimeEngine;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. All fields are
/// `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Real-time engine.
    pub engine: Arc<RealtimeEngine>,
    /// Upgrade-token authenticator.
    pub authenticator: Arc<TokenAuthenticator>,
}
