//! Telegram Bot API request/response types

use serde::{Deserialize, Serialize};

/// Telegram Bot API base URL
pub(crate) const API_BASE: &str = "https://api.telegram.org/bot";

/// Telegram sendMessage request
#[derive(Serialize)]
pub(crate) struct SendMessageRequest {
    pub chat_id: i64,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<String>,
}

/// Telegram setWebhook request
#[derive(Serialize)]
pub(crate) struct SetWebhookRequest {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_updates: Option<Vec<String>>,
}

/// Telegram getUpdates request
#[derive(Serialize)]
pub(crate) struct GetUpdatesRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    pub timeout: u64,
    pub allowed_updates: Vec<String>,
}

/// Telegram API response envelope
#[derive(Debug, Deserialize)]
pub struct TelegramResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

/// Bot identity from getMe
#[derive(Debug, Deserialize)]
pub struct BotInfo {
    pub id: i64,
    pub username: Option<String>,
}
