//! Health check and debug endpoints

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use super::ApiState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub env: EnvPresence,
}

/// Credential presence flags — booleans only, never the values
#[derive(Serialize)]
pub struct EnvPresence {
    pub has_bot_token: bool,
    pub has_completion_key: bool,
    pub has_public_url: bool,
}

impl EnvPresence {
    fn from_state(state: &ApiState) -> Self {
        Self {
            has_bot_token: state.has_bot_token,
            has_completion_key: state.has_completion_key,
            has_public_url: state.public_url.is_some(),
        }
    }
}

/// Liveness probe with configuration presence flags
pub async fn health(State(state): State<Arc<ApiState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "running",
        timestamp: chrono::Utc::now().to_rfc3339(),
        env: EnvPresence::from_state(&state),
    })
}

/// Debug echo response
#[derive(Serialize)]
pub struct DebugEcho {
    pub received: bool,
    pub body: Value,
    pub env: EnvPresence,
}

/// Plain-text debug probe
pub async fn debug_get() -> &'static str {
    "Debug endpoint working!"
}

/// Echo the received body back with configuration presence flags.
/// Tolerates any body, JSON or not.
pub async fn debug_post(
    State(state): State<Arc<ApiState>>,
    body: String,
) -> Json<DebugEcho> {
    let body = serde_json::from_str(&body).unwrap_or(Value::Null);
    tracing::debug!(%body, "debug request received");

    Json(DebugEcho {
        received: true,
        body,
        env: EnvPresence::from_state(&state),
    })
}

/// Log-and-acknowledge endpoint for verifying webhook reachability
pub async fn test_webhook(body: String) -> &'static str {
    tracing::info!(body = %body, "test webhook received");
    "Test webhook received"
}
