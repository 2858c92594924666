//! Telegram webhook handlers (push mode)

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use super::ApiState;
use crate::telegram::Update;

/// Constant acknowledgment body for the update endpoint
#[derive(Serialize)]
pub struct WebhookResponse {
    pub ok: bool,
}

/// Handle one pushed update.
///
/// Acknowledges before processing; the platform retries updates that are
/// not acked promptly. Payloads without a usable message are acked with
/// zero events so upstream retries stop.
pub async fn handle_update(
    State(state): State<Arc<ApiState>>,
    Json(update): Json<Update>,
) -> Json<WebhookResponse> {
    tracing::debug!(update_id = ?update.update_id, "received webhook update");

    let Some(event) = update.into_event() else {
        return Json(WebhookResponse { ok: true });
    };

    // Push mode requires text; media-only and empty messages are dropped
    if event.text.is_none() {
        return Json(WebhookResponse { ok: true });
    }

    let pipeline = state.pipeline.clone();
    tokio::spawn(async move {
        let outcome = pipeline.handle(event).await;
        tracing::debug!(?outcome, "webhook update handled");
    });

    Json(WebhookResponse { ok: true })
}

/// Webhook registration summary
#[derive(Serialize)]
pub struct SetupWebhookResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set_result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SetupWebhookResponse {
    fn failure(error: String) -> Self {
        Self {
            success: false,
            webhook_url: None,
            delete_result: None,
            set_result: None,
            error: Some(error),
        }
    }
}

/// Re-register the webhook: delete any existing registration, then point
/// the platform at `{public_url}/webhook`.
pub async fn setup_webhook(State(state): State<Arc<ApiState>>) -> Json<SetupWebhookResponse> {
    let Some(public_url) = &state.public_url else {
        return Json(SetupWebhookResponse::failure(
            "PUBLIC_URL is not configured".to_string(),
        ));
    };

    let webhook_url = format!("{}/webhook", public_url.trim_end_matches('/'));
    tracing::info!(url = %webhook_url, "registering webhook");

    let delete_result = match state.channel.delete_webhook().await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(error = %e, "webhook deletion failed");
            return Json(SetupWebhookResponse::failure(e.to_string()));
        }
    };

    let set_result = match state.channel.set_webhook(&webhook_url).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(error = %e, "webhook registration failed");
            return Json(SetupWebhookResponse::failure(e.to_string()));
        }
    };

    Json(SetupWebhookResponse {
        success: true,
        webhook_url: Some(webhook_url),
        delete_result: Some(delete_result),
        set_result: Some(set_result),
        error: None,
    })
}
