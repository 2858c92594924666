//! Telegram channel adapter
//!
//! Raw Bot API client plus the two inbound transports (webhook handling
//! lives in `crate::api`, the getUpdates loop in [`polling`]).

mod api;
pub mod chunking;
pub mod cursor;
pub mod polling;
pub mod types;
pub mod update;

use reqwest::Client;

use crate::Result;

pub use cursor::UpdateCursor;
pub use update::Update;

/// Telegram channel adapter
#[derive(Clone)]
pub struct TelegramChannel {
    token: String,
    client: Client,
    api_base: String,
}

impl TelegramChannel {
    /// Create a new Telegram channel adapter
    #[must_use]
    pub fn new(token: String) -> Self {
        Self {
            token,
            client: Client::new(),
            api_base: types::API_BASE.to_string(),
        }
    }

    /// Create an adapter against a non-default API base (tests)
    #[must_use]
    pub fn with_api_base(token: String, api_base: String) -> Self {
        Self {
            token,
            client: Client::new(),
            api_base,
        }
    }

    /// URL for a Bot API method
    fn method_url(&self, method: &str) -> String {
        format!("{}{}/{method}", self.api_base, self.token)
    }

    /// Send an ordered sequence of chunks to a chat.
    ///
    /// Each send completes before the next starts so the user sees the
    /// answer in order. The first failure stops delivery; chunks already
    /// sent are not retracted.
    ///
    /// # Errors
    ///
    /// Returns the error of the first failed send.
    pub async fn deliver(&self, chat_id: i64, chunks: &[String]) -> Result<()> {
        for chunk in chunks {
            self.send_message(chat_id, chunk).await?;
        }
        Ok(())
    }
}
