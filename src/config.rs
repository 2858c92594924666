//! Configuration management for the MediQ gateway
//!
//! All configuration is read once at startup. Credentials come from the
//! environment; tunables have CLI/env overrides wired up in `main.rs`.

use crate::{Error, Result};

/// Default completion backend base URL
const DEFAULT_COMPLETION_BASE_URL: &str = "https://api.mistral.ai/v1";

/// Default completion model
const DEFAULT_COMPLETION_MODEL: &str = "mistral-tiny";

/// Default sampling temperature
const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Default output token bound
const DEFAULT_MAX_TOKENS: u32 = 500;

/// How inbound updates reach the gateway. Exactly one mode is active per process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TransportMode {
    /// Platform pushes updates to the registered `/webhook` endpoint
    Webhook,
    /// Gateway pulls updates with a long-poll `getUpdates` loop
    Polling,
}

/// Gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram bot credential (`TELEGRAM_BOT_TOKEN`)
    pub telegram_token: String,

    /// Completion backend configuration
    pub completion: CompletionConfig,

    /// Externally reachable base URL for webhook registration
    /// (`PUBLIC_URL`, webhook mode only)
    pub public_url: Option<String>,

    /// Active transport mode
    pub mode: TransportMode,

    /// Port for the webhook/health HTTP server
    pub port: u16,

    /// Discard any pending update backlog before the first poll
    pub discard_backlog: bool,
}

/// Completion backend configuration
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    /// Backend credential (`MISTRAL_API_KEY`)
    pub api_key: String,

    /// API base URL, `{base}/chat/completions` is appended
    pub base_url: String,

    /// Model identifier
    pub model: String,

    /// Sampling temperature
    pub temperature: f64,

    /// Maximum output tokens per completion
    pub max_tokens: u32,
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if a required credential is missing.
    pub fn from_env(mode: TransportMode, port: u16, discard_backlog: bool) -> Result<Self> {
        let telegram_token = require_env("TELEGRAM_BOT_TOKEN")?;
        let api_key = require_env("MISTRAL_API_KEY")?;

        let completion = CompletionConfig {
            api_key,
            base_url: std::env::var("COMPLETION_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_COMPLETION_BASE_URL.to_string()),
            model: std::env::var("COMPLETION_MODEL")
                .unwrap_or_else(|_| DEFAULT_COMPLETION_MODEL.to_string()),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        };

        Ok(Self {
            telegram_token,
            completion,
            public_url: std::env::var("PUBLIC_URL").ok().filter(|u| !u.is_empty()),
            mode,
            port,
            discard_backlog,
        })
    }

    /// Whether the bot credential is present (health reporting, never the value)
    #[must_use]
    pub fn has_bot_token(&self) -> bool {
        !self.telegram_token.is_empty()
    }

    /// Whether the completion credential is present
    #[must_use]
    pub fn has_completion_key(&self) -> bool {
        !self.completion.api_key.is_empty()
    }

    /// Whether a public URL for webhook registration is configured
    #[must_use]
    pub fn has_public_url(&self) -> bool {
        self.public_url.is_some()
    }
}

/// Read a required environment variable, rejecting empty values
fn require_env(name: &str) -> Result<String> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::Config(format!("{name} is not set")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_defaults() {
        let completion = CompletionConfig {
            api_key: "k".to_string(),
            base_url: DEFAULT_COMPLETION_BASE_URL.to_string(),
            model: DEFAULT_COMPLETION_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        };
        assert_eq!(completion.base_url, "https://api.mistral.ai/v1");
        assert_eq!(completion.model, "mistral-tiny");
        assert!((completion.temperature - 0.7).abs() < f64::EPSILON);
        assert_eq!(completion.max_tokens, 500);
    }

    #[test]
    fn presence_flags_reflect_config() {
        let config = Config {
            telegram_token: "t".to_string(),
            completion: CompletionConfig {
                api_key: "k".to_string(),
                base_url: DEFAULT_COMPLETION_BASE_URL.to_string(),
                model: DEFAULT_COMPLETION_MODEL.to_string(),
                temperature: DEFAULT_TEMPERATURE,
                max_tokens: DEFAULT_MAX_TOKENS,
            },
            public_url: None,
            mode: TransportMode::Webhook,
            port: 3000,
            discard_backlog: false,
        };
        assert!(config.has_bot_token());
        assert!(config.has_completion_key());
        assert!(!config.has_public_url());
    }
}
