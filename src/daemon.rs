//! Gateway daemon — transport-mode selection and lifecycle
//!
//! Exactly one transport mode is active per process; both feed the same
//! pipeline. Shutdown happens only on ctrl-c.

use std::sync::Arc;

use crate::api::{ApiServer, ApiState};
use crate::completion::CompletionClient;
use crate::config::{Config, TransportMode};
use crate::pipeline::Pipeline;
use crate::telegram::{polling, TelegramChannel};
use crate::Result;

/// The running gateway
pub struct Daemon {
    config: Config,
    channel: TelegramChannel,
    pipeline: Pipeline,
}

impl Daemon {
    /// Build clients and verify the bot credential.
    ///
    /// # Errors
    ///
    /// Returns error if the Telegram credential is rejected.
    pub async fn new(config: Config) -> Result<Self> {
        let channel = TelegramChannel::new(config.telegram_token.clone());

        let me = channel.get_me().await?;
        tracing::info!(bot_id = me.id, username = ?me.username, "Telegram credential verified");

        let completion = CompletionClient::new(config.completion.clone());
        let pipeline = Pipeline::new(channel.clone(), completion);

        Ok(Self {
            config,
            channel,
            pipeline,
        })
    }

    /// Run the selected transport until shutdown.
    ///
    /// # Errors
    ///
    /// Returns error if the webhook server fails to bind or serve.
    pub async fn run(self) -> Result<()> {
        match self.config.mode {
            TransportMode::Webhook => {
                let has_bot_token = self.config.has_bot_token();
                let has_completion_key = self.config.has_completion_key();
                let state = Arc::new(ApiState {
                    channel: self.channel,
                    pipeline: Arc::new(self.pipeline),
                    public_url: self.config.public_url,
                    has_bot_token,
                    has_completion_key,
                });
                let server = ApiServer::new(state, self.config.port);

                tokio::select! {
                    result = server.run() => result,
                    () = shutdown_signal() => {
                        tracing::info!("shutdown requested");
                        Ok(())
                    }
                }
            }
            TransportMode::Polling => {
                tokio::select! {
                    () = polling::run(
                        self.channel,
                        self.pipeline,
                        self.config.discard_backlog,
                    ) => Ok(()),
                    () = shutdown_signal() => {
                        tracing::info!("shutdown requested");
                        Ok(())
                    }
                }
            }
        }
    }
}

/// Resolve when the process receives ctrl-c
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; run until killed
        std::future::pending::<()>().await;
    }
}
