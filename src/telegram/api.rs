//! Raw Telegram Bot API calls

use serde_json::Value;

use super::types::{
    BotInfo, GetUpdatesRequest, SendMessageRequest, SetWebhookRequest, TelegramResponse,
};
use super::update::Update;
use crate::{Error, Result};

impl super::TelegramChannel {
    /// Send a message to a chat.
    ///
    /// Uses HTML parse mode with a plain-text fallback: model output often
    /// contains stray `<`/`&` that the entity parser rejects.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails in both modes.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let url = self.method_url("sendMessage");

        let request = SendMessageRequest {
            chat_id,
            text: text.to_string(),
            parse_mode: Some("HTML".to_string()),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Channel(format!("Telegram API error: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let body_lower = body.to_lowercase();

            // Unreachable chats won't improve on retry
            if body_lower.contains("chat not found")
                || body_lower.contains("bot was blocked by the user")
            {
                return Err(Error::Channel(format!(
                    "Telegram chat {chat_id} not reachable: {body}"
                )));
            }

            let fallback = SendMessageRequest {
                chat_id,
                text: text.to_string(),
                parse_mode: None,
            };

            let fallback_response = self
                .client
                .post(&url)
                .json(&fallback)
                .send()
                .await
                .map_err(|e| Error::Channel(format!("Telegram API error: {e}")))?;

            if !fallback_response.status().is_success() {
                return Err(Error::Channel(format!(
                    "Telegram API error: {status} - {body}"
                )));
            }
        }

        tracing::debug!(chat_id, "Telegram message sent");
        Ok(())
    }

    /// Set the webhook URL for receiving updates.
    ///
    /// Returns the platform's raw response envelope so the admin endpoint
    /// can report it verbatim.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    pub async fn set_webhook(&self, url: &str) -> Result<Value> {
        let api_url = self.method_url("setWebhook");

        let request = SetWebhookRequest {
            url: url.to_string(),
            allowed_updates: Some(vec!["message".to_string()]),
        };

        let response = self
            .client
            .post(&api_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Channel(format!("Telegram setWebhook error: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Channel(format!(
                "Telegram setWebhook error: {status} - {body}"
            )));
        }

        let result = response
            .json::<Value>()
            .await
            .map_err(|e| Error::Channel(format!("Telegram setWebhook parse error: {e}")))?;

        tracing::info!(url, "Telegram webhook set");
        Ok(result)
    }

    /// Delete the webhook registration (required before polling).
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    pub async fn delete_webhook(&self) -> Result<Value> {
        let url = self.method_url("deleteWebhook");

        let response = self
            .client
            .post(&url)
            .send()
            .await
            .map_err(|e| Error::Channel(format!("Telegram deleteWebhook error: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Channel(format!(
                "Telegram deleteWebhook error: {status} - {body}"
            )));
        }

        let result = response
            .json::<Value>()
            .await
            .map_err(|e| Error::Channel(format!("Telegram deleteWebhook parse error: {e}")))?;

        tracing::info!("Telegram webhook deleted");
        Ok(result)
    }

    /// Fetch a batch of pending updates with a bounded long-poll wait.
    ///
    /// `offset` of `None` asks for the oldest unconfirmed updates; `-1`
    /// asks for only the most recent one (backlog discard).
    ///
    /// # Errors
    ///
    /// Returns error on transport failure, non-success status, or an
    /// `ok: false` envelope.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<Update>> {
        let url = self.method_url("getUpdates");

        let request = GetUpdatesRequest {
            offset,
            timeout: timeout_secs,
            allowed_updates: vec!["message".to_string()],
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Channel(format!("Telegram getUpdates error: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Channel(format!(
                "Telegram getUpdates error: {status} - {body}"
            )));
        }

        let envelope = response
            .json::<TelegramResponse<Vec<Update>>>()
            .await
            .map_err(|e| Error::Channel(format!("Telegram getUpdates parse error: {e}")))?;

        if !envelope.ok {
            return Err(Error::Channel(format!(
                "Telegram getUpdates rejected: {}",
                envelope.description.unwrap_or_default()
            )));
        }

        Ok(envelope.result.unwrap_or_default())
    }

    /// Verify the bot credential and fetch the bot identity.
    ///
    /// # Errors
    ///
    /// Returns error if the credential is rejected or the request fails.
    pub async fn get_me(&self) -> Result<BotInfo> {
        let url = self.method_url("getMe");

        let response = self
            .client
            .post(&url)
            .send()
            .await
            .map_err(|e| Error::Channel(format!("Telegram getMe error: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Channel(format!(
                "Telegram getMe error: {status} - {body}"
            )));
        }

        let envelope = response
            .json::<TelegramResponse<BotInfo>>()
            .await
            .map_err(|e| Error::Channel(format!("Telegram getMe parse error: {e}")))?;

        envelope.result.ok_or_else(|| {
            Error::Channel(format!(
                "Telegram getMe rejected: {}",
                envelope.description.unwrap_or_default()
            ))
        })
    }
}
