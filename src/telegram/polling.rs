//! Polling mode — getUpdates loop
//!
//! A single sequential loop: at most one batch in flight, updates within a
//! batch dispatched one at a time in arrival order. The cursor lives here
//! and nowhere else, so its mutation is serialized by construction.

use std::time::Duration;

use super::cursor::UpdateCursor;
use super::update::Update;
use super::TelegramChannel;
use crate::pipeline::Pipeline;

/// Long-poll wait requested from the platform
const LONG_POLL_SECS: u64 = 30;

/// Fixed backoff after a transport failure
const RETRY_BACKOFF: Duration = Duration::from_secs(5);

/// Run the polling loop until the process shuts down.
///
/// Deletes any existing webhook registration first — getUpdates conflicts
/// with an active webhook. With `discard_backlog`, pending updates are
/// dropped once at startup and the cursor starts past them.
pub async fn run(channel: TelegramChannel, pipeline: Pipeline, discard_backlog: bool) {
    if let Err(e) = channel.delete_webhook().await {
        tracing::warn!(error = %e, "failed to delete webhook before polling");
    }

    let mut cursor = UpdateCursor::new();

    if discard_backlog {
        match channel.get_updates(Some(-1), 0).await {
            Ok(updates) => {
                if let Some(last) = updates.iter().filter_map(|u| u.update_id).max() {
                    cursor = UpdateCursor::after(last);
                    tracing::info!(offset = cursor.offset(), "pending backlog discarded");
                }
            }
            Err(e) => tracing::warn!(error = %e, "backlog discard failed"),
        }
    }

    tracing::info!(offset = cursor.offset(), "polling for updates");

    loop {
        let offset = (cursor.offset() > 0).then(|| cursor.offset());

        match channel.get_updates(offset, LONG_POLL_SECS).await {
            Ok(batch) => dispatch_batch(&pipeline, &mut cursor, batch).await,
            Err(e) => {
                // Cursor untouched; the same batch is requested again
                tracing::warn!(error = %e, "getUpdates failed, backing off");
                tokio::time::sleep(RETRY_BACKOFF).await;
            }
        }
    }
}

/// Dispatch one batch through the pipeline, in arrival order.
///
/// Every update is acknowledged exactly once after the pipeline reaches a
/// terminal state — failed processing included — so one poisonous update
/// cannot wedge the queue. Already-acknowledged ids (overlap from a
/// resend) are skipped without dispatch.
async fn dispatch_batch(pipeline: &Pipeline, cursor: &mut UpdateCursor, batch: Vec<Update>) {
    for update in batch {
        let Some(update_id) = update.update_id else {
            continue;
        };

        if !cursor.should_process(update_id) {
            tracing::debug!(update_id, "already acknowledged, skipping");
            continue;
        }

        if let Some(event) = update.into_event() {
            let outcome = pipeline.handle(event).await;
            tracing::debug!(update_id, ?outcome, "update handled");
        }

        cursor.acknowledge(update_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::CompletionClient;
    use crate::config::CompletionConfig;
    use crate::telegram::update::{Chat, Message};

    fn update(id: i64, chat_id: i64, text: &str) -> Update {
        Update {
            update_id: Some(id),
            message: Some(Message {
                chat: Chat { id: chat_id },
                from: None,
                text: Some(text.to_string()),
            }),
        }
    }

    fn test_pipeline(backend: &mockito::Server, telegram: &mockito::Server) -> Pipeline {
        let channel = crate::telegram::TelegramChannel::with_api_base(
            "tok".to_string(),
            format!("{}/bot", telegram.url()),
        );
        let completion = CompletionClient::new(CompletionConfig {
            api_key: "k".to_string(),
            base_url: backend.url(),
            model: "mistral-tiny".to_string(),
            temperature: 0.7,
            max_tokens: 500,
        });
        Pipeline::new(channel, completion)
    }

    // ---- overlap filtering ----

    #[tokio::test]
    async fn overlapping_batch_is_not_redispatched() {
        let mut backend = mockito::Server::new_async().await;
        let mut telegram = mockito::Server::new_async().await;

        // 3 updates in the first batch + 1 new one in the resent batch
        let completion = backend
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"content":"ok"}}]}"#)
            .expect(4)
            .create_async()
            .await;
        telegram
            .mock("POST", "/bottok/sendMessage")
            .with_status(200)
            .with_body(r#"{"ok":true,"result":{"message_id":1}}"#)
            .create_async()
            .await;

        let pipeline = test_pipeline(&backend, &telegram);
        let mut cursor = UpdateCursor::new();

        let first = vec![update(5, 1, "a"), update(6, 1, "b"), update(7, 1, "c")];
        dispatch_batch(&pipeline, &mut cursor, first).await;
        assert_eq!(cursor.offset(), 8);

        let resent = vec![update(6, 1, "b"), update(7, 1, "c"), update(8, 1, "d")];
        dispatch_batch(&pipeline, &mut cursor, resent).await;
        assert_eq!(cursor.offset(), 9);

        completion.assert_async().await;
    }

    // ---- acknowledge-on-failure ----

    #[tokio::test]
    async fn failed_update_is_still_acknowledged() {
        let mut backend = mockito::Server::new_async().await;
        let mut telegram = mockito::Server::new_async().await;

        backend
            .mock("POST", "/chat/completions")
            .with_status(500)
            .create_async()
            .await;
        telegram
            .mock("POST", "/bottok/sendMessage")
            .with_status(200)
            .with_body(r#"{"ok":true,"result":{"message_id":1}}"#)
            .create_async()
            .await;

        let pipeline = test_pipeline(&backend, &telegram);
        let mut cursor = UpdateCursor::new();

        dispatch_batch(&pipeline, &mut cursor, vec![update(5, 1, "a")]).await;

        // Terminal failure still advances the cursor: no second attempt
        assert_eq!(cursor.offset(), 6);
        assert!(!cursor.should_process(5));
    }

    // ---- eventless updates ----

    #[tokio::test]
    async fn eventless_update_is_acknowledged_without_dispatch() {
        let backend = mockito::Server::new_async().await;
        let telegram = mockito::Server::new_async().await;

        let pipeline = test_pipeline(&backend, &telegram);
        let mut cursor = UpdateCursor::new();

        let no_message = Update {
            update_id: Some(12),
            message: None,
        };
        dispatch_batch(&pipeline, &mut cursor, vec![no_message]).await;

        assert_eq!(cursor.offset(), 13);
    }
}
