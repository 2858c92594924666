//! Event processing pipeline
//!
//! One inbound event flows receive → complete → chunk → deliver, with a
//! single best-effort apology on any failure. Errors never escape
//! [`Pipeline::handle`]; both outcomes mean the event is fully handled and
//! the transport may acknowledge it.

use crate::completion::CompletionClient;
use crate::telegram::chunking::chunk_text;
use crate::telegram::TelegramChannel;

/// Substituted for absent or empty message text before completion
const EMPTY_MESSAGE_PLACEHOLDER: &str = "[empty message]";

/// Appended after every successful answer, as its own message
pub const RESOURCES_NOTICE: &str = "\
Reminder: Dr. AI is an AI assistant, not a licensed physician. \
For urgent concerns contact your local emergency services or consult \
a healthcare provider.";

/// Sent once, best-effort, when processing fails
pub const APOLOGY_MESSAGE: &str =
    "Sorry, I encountered an error processing your message. Please try again later.";

/// An inbound chat event, consumed once and discarded
#[derive(Debug, Clone)]
pub struct InboundEvent {
    /// Originating chat
    pub chat_id: i64,
    /// Message text, absent for non-text messages
    pub text: Option<String>,
    /// Update sequence id (polling mode only)
    pub update_id: Option<i64>,
}

/// Terminal processing state. Either way the event is fully handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Answer delivered
    Done,
    /// Processing failed; apology attempted
    Failed,
}

/// Wires completion and delivery together for one event at a time
#[derive(Clone)]
pub struct Pipeline {
    channel: TelegramChannel,
    completion: CompletionClient,
}

impl Pipeline {
    /// Create a new pipeline
    #[must_use]
    pub fn new(channel: TelegramChannel, completion: CompletionClient) -> Self {
        Self {
            channel,
            completion,
        }
    }

    /// Process one event to a terminal state. Never returns an error and
    /// never panics on backend failure; every failure path ends in the
    /// apology fallback.
    pub async fn handle(&self, event: InboundEvent) -> Outcome {
        let chat_id = event.chat_id;
        let text = event
            .text
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| EMPTY_MESSAGE_PLACEHOLDER.to_string());

        tracing::info!(chat_id, update_id = ?event.update_id, "processing message");

        let answer = match self.completion.complete(&text).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::error!(chat_id, error = %e, "completion failed");
                self.apologize(chat_id).await;
                return Outcome::Failed;
            }
        };

        // Limit 0 selects the platform default (4096)
        let chunks = chunk_text(&answer, 0);
        if let Err(e) = self.channel.deliver(chat_id, &chunks).await {
            tracing::error!(chat_id, error = %e, "delivery failed");
            self.apologize(chat_id).await;
            return Outcome::Failed;
        }

        // The notice is informational; losing it does not fail the event
        if let Err(e) = self.channel.send_message(chat_id, RESOURCES_NOTICE).await {
            tracing::warn!(chat_id, error = %e, "resources notice not delivered");
        }

        tracing::info!(chat_id, chunks = chunks.len(), "answer delivered");
        Outcome::Done
    }

    /// One best-effort apology. A failure here is logged and dropped —
    /// no retries, no re-queue.
    async fn apologize(&self, chat_id: i64) {
        if let Err(e) = self.channel.send_message(chat_id, APOLOGY_MESSAGE).await {
            tracing::error!(chat_id, error = %e, "apology not delivered");
        }
    }
}
