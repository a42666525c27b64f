//! Run command handler.
//!
//! Starts the Telegram bot and serves messages until SIGINT or SIGTERM.

use crate::assistant::Assistant;
use crate::gateway::{ChatGateway, TelegramClient};
use clap::Args;
use kbot_core::{AppError, AppResult, BotConfig};
use std::sync::Arc;
use tokio::sync::watch;

/// Run the Telegram bot (default)
#[derive(Args, Debug, Default)]
pub struct RunCommand {}

impl RunCommand {
    /// Execute the run command.
    pub async fn execute(&self, config: &BotConfig) -> AppResult<()> {
        tracing::info!("Starting Notion knowledge bot");

        let telegram = TelegramClient::new(config.telegram_token.clone());
        let me = telegram
            .get_me()
            .await
            .map_err(|e| AppError::Transport(format!("Failed to start the bot: {}", e)))?;
        tracing::info!(
            "Telegram bot: @{} ({})",
            me.username.as_deref().unwrap_or("unknown"),
            me.first_name
        );

        let assistant = Assistant::from_config(config)?;

        let (stop_polling, polling_stopped) = watch::channel(false);
        let inbound = telegram.start_polling(polling_stopped);
        let gateway = Arc::new(ChatGateway::new(Arc::new(telegram), assistant));

        tracing::info!("Bot started, listening for messages");
        gateway.run(inbound, shutdown_signal()).await;

        // The polling task may already be gone.
        let _ = stop_polling.send(true);
        tracing::info!("Telegram bot stopped");
        Ok(())
    }
}

/// Resolve on the first SIGINT or SIGTERM.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for SIGINT: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => tracing::info!("Received SIGINT, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
