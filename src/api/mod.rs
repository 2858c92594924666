//! HTTP server for webhook mode
//!
//! Hosts the update endpoint, the webhook registration admin endpoint,
//! and the health/debug surface.

pub mod health;
pub mod webhook;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::pipeline::Pipeline;
use crate::telegram::TelegramChannel;
use crate::{Error, Result};

/// Shared state for API handlers
pub struct ApiState {
    /// Channel adapter for webhook registration and delivery
    pub channel: TelegramChannel,
    /// Event pipeline; webhook dispatches run on spawned tasks
    pub pipeline: Arc<Pipeline>,
    /// Externally reachable base URL for webhook registration
    pub public_url: Option<String>,
    /// Credential presence flags for health reporting
    pub has_bot_token: bool,
    pub has_completion_key: bool,
}

/// HTTP API server
pub struct ApiServer {
    state: Arc<ApiState>,
    port: u16,
}

impl ApiServer {
    /// Create a server from shared state
    #[must_use]
    pub const fn new(state: Arc<ApiState>, port: u16) -> Self {
        Self { state, port }
    }

    /// Build the router
    #[must_use]
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(health::health))
            .route("/webhook", post(webhook::handle_update))
            .route("/setup-webhook", get(webhook::setup_webhook))
            .route("/debug", get(health::debug_get).post(health::debug_post))
            .route("/test-webhook", post(health::test_webhook))
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until the process shuts down.
    ///
    /// # Errors
    ///
    /// Returns error if the listener fails to bind or the server fails.
    pub async fn run(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| Error::Config(format!("failed to bind API server: {e}")))?;

        tracing::info!(port = self.port, "API server listening");

        axum::serve(listener, self.router())
            .await
            .map_err(|e| Error::Config(format!("API server error: {e}")))?;

        Ok(())
    }
}
