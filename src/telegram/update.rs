//! Inbound Telegram update types and event conversion
//!
//! One set of wire types serves both transports: webhook bodies and
//! getUpdates results carry the same `Update` shape.

use serde::Deserialize;

use crate::pipeline::InboundEvent;

/// A single Telegram update
#[derive(Debug, Deserialize)]
pub struct Update {
    /// Monotonically increasing update identifier.
    /// Always present on the wire; optional here so a bare `{}` webhook
    /// body still deserializes and can be acknowledged.
    pub update_id: Option<i64>,
    pub message: Option<Message>,
}

/// Message payload of an update
#[derive(Debug, Deserialize)]
pub struct Message {
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
}

/// Chat the message originated from
#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// Sender of the message
#[derive(Debug, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
}

impl Update {
    /// Convert this update into an event for the pipeline.
    ///
    /// Returns `None` for updates with no message and for messages sent by
    /// bots (including our own echoes). Text may be absent; the pipeline
    /// substitutes a placeholder before completing.
    #[must_use]
    pub fn into_event(self) -> Option<InboundEvent> {
        let update_id = self.update_id;
        let message = self.message?;

        if message.from.as_ref().is_some_and(|u| u.is_bot) {
            return None;
        }

        Some(InboundEvent {
            chat_id: message.chat.id,
            text: message.text.filter(|t| !t.is_empty()),
            update_id,
        })
    }
}
