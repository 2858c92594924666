//! Completion backend client
//!
//! Sends the fixed system directive plus the user's text to a hosted
//! chat-completions API and returns the generated answer. Failures are
//! classified, never retried; the pipeline decides the user-facing
//! fallback.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::CompletionConfig;
use crate::{Error, Result};

/// System directive sent with every request. Loaded once, never re-parsed.
const SYSTEM_PROMPT: &str = "\
You are Dr. AI, a helpful and knowledgeable medical assistant. Always:
1. Maintain a professional and empathetic tone
2. Clearly state you are an AI assistant, not a real doctor
3. Recommend consulting with a real healthcare provider for serious concerns
4. Only provide general medical information and avoid specific diagnoses
5. Keep responses clear and easy to understand";

/// Chat-completions request body
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

/// A single chat message
#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Chat-completions response body
#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Completion backend client
#[derive(Clone)]
pub struct CompletionClient {
    client: Client,
    config: CompletionConfig,
}

impl CompletionClient {
    /// Create a new completion client
    #[must_use]
    pub fn new(config: CompletionConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Request a completion for the user's text.
    ///
    /// Builds exactly two messages — the system directive and the user
    /// text — and calls the backend once. `user_text` must be non-empty;
    /// the caller substitutes a placeholder for absent text.
    ///
    /// # Errors
    ///
    /// - `Error::BackendUnavailable` when the backend cannot be reached
    /// - `Error::BackendError` on a non-success status
    /// - `Error::MalformedResponse` when a 2xx payload lacks generated text
    pub async fn complete(&self, user_text: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.config.base_url);

        let request = ChatRequest {
            model: self.config.model.as_str(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: user_text,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::BackendUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::BackendError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed = response
            .json::<ChatResponse>()
            .await
            .map_err(|e| Error::MalformedResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .ok_or_else(|| {
                Error::MalformedResponse("response has no generated text".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: String) -> CompletionClient {
        CompletionClient::new(CompletionConfig {
            api_key: "test-key".to_string(),
            base_url,
            model: "mistral-tiny".to_string(),
            temperature: 0.7,
            max_tokens: 500,
        })
    }

    // ---- success path ----

    #[tokio::test]
    async fn returns_generated_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"Take rest."}}]}"#)
            .create_async()
            .await;

        let client = test_client(server.url());
        let answer = client.complete("I have a cold").await.expect("completion");
        assert_eq!(answer, "Take rest.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn sends_system_directive_before_user_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "model": "mistral-tiny",
                "messages": [
                    {"role": "system"},
                    {"role": "user", "content": "hello"}
                ],
                "max_tokens": 500
            })))
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"content":"hi"}}]}"#)
            .create_async()
            .await;

        let client = test_client(server.url());
        client.complete("hello").await.expect("completion");
        mock.assert_async().await;
    }

    // ---- failure classification ----

    #[tokio::test]
    async fn non_success_status_is_backend_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(500)
            .with_body("upstream exploded")
            .create_async()
            .await;

        let client = test_client(server.url());
        match client.complete("hello").await {
            Err(Error::BackendError { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "upstream exploded");
            }
            other => panic!("expected BackendError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_choices_is_malformed_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let client = test_client(server.url());
        assert!(matches!(
            client.complete("hello").await,
            Err(Error::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn unparseable_body_is_malformed_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body("not json at all")
            .create_async()
            .await;

        let client = test_client(server.url());
        assert!(matches!(
            client.complete("hello").await,
            Err(Error::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_backend_is_backend_unavailable() {
        // Nothing listens on this port
        let client = test_client("http://127.0.0.1:9".to_string());
        assert!(matches!(
            client.complete("hello").await,
            Err(Error::BackendUnavailable(_))
        ));
    }
}
