//! Telegram Bot API transport: long polling plus message operations.
//!
//! Bot API: https://core.telegram.org/bots/api

use crate::gateway::transport::{ChatTransport, IncomingMessage, ParseMode, SentMessage};
use kbot_core::{AppError, AppResult, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::{mpsc, watch};

/// Default API base URL.
pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Long-poll timeout passed to `getUpdates`, in seconds.
const POLL_TIMEOUT_SECS: u64 = 30;

/// Pause after a failed poll before polling again.
const POLL_ERROR_DELAY: Duration = Duration::from_secs(5);

/// Telegram Bot API client.
#[derive(Clone)]
pub struct TelegramClient {
    base_url: String,
    token: Secret,
    client: reqwest::Client,
}

impl TelegramClient {
    pub fn new(token: Secret) -> Self {
        Self::with_base_url(token, TELEGRAM_API_URL)
    }

    pub fn with_base_url(token: Secret, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            client: reqwest::Client::new(),
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token.expose(), method)
    }

    /// Call a Bot API method and unwrap its `result`.
    async fn call<B, T>(&self, method: &str, body: &B) -> AppResult<T>
    where
        B: Serialize + ?Sized,
        T: serde::de::DeserializeOwned,
    {
        // Request URLs carry the token, so they are stripped from errors.
        let response = self
            .client
            .post(self.api_url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Transport(format!("{} failed: {}", method, e.without_url())))?;

        let body: ApiResponse<T> = response.json().await.map_err(|e| {
            AppError::Transport(format!("Invalid {} response: {}", method, e.without_url()))
        })?;

        if !body.ok {
            return Err(AppError::Transport(format!(
                "Telegram API error in {}: {}",
                method,
                body.description.unwrap_or_default()
            )));
        }

        body.result
            .ok_or_else(|| AppError::Transport(format!("{} returned no result", method)))
    }

    /// Identity of the bot the token belongs to.
    pub async fn get_me(&self) -> AppResult<TelegramUser> {
        self.call("getMe", &serde_json::json!({})).await
    }

    /// Fetch updates after `offset`, waiting up to the long-poll timeout.
    pub async fn get_updates(&self, offset: i64) -> AppResult<Vec<TelegramUpdate>> {
        self.call(
            "getUpdates",
            &serde_json::json!({
                "offset": offset,
                "timeout": POLL_TIMEOUT_SECS,
                "allowed_updates": ["message"],
            }),
        )
        .await
    }

    /// Poll for messages in a background task until `shutdown` flips to
    /// `true` or the receiver is dropped.
    pub fn start_polling(&self, mut shutdown: watch::Receiver<bool>) -> mpsc::Receiver<IncomingMessage> {
        let (tx, rx) = mpsc::channel(64);
        let client = self.clone();

        tokio::spawn(async move {
            tracing::info!("Telegram polling loop started");
            let mut last_update_id = 0i64;

            loop {
                let updates = tokio::select! {
                    _ = shutdown.changed() => break,
                    result = client.get_updates(last_update_id + 1) => result,
                };

                match updates {
                    Ok(updates) => {
                        for update in updates {
                            last_update_id = last_update_id.max(update.update_id);
                            let Some(message) = update.into_incoming() else {
                                continue;
                            };
                            if tx.send(message).await.is_err() {
                                tracing::info!("Telegram polling stopped (receiver dropped)");
                                return;
                            }
                        }
                    }
                    Err(e) => {
                        tracing::error!("Polling error: {}", e);
                        tokio::select! {
                            _ = shutdown.changed() => break,
                            _ = tokio::time::sleep(POLL_ERROR_DELAY) => {}
                        }
                    }
                }
            }

            tracing::info!("Telegram polling loop stopped");
        });

        rx
    }
}

#[async_trait::async_trait]
impl ChatTransport for TelegramClient {
    fn transport_name(&self) -> &str {
        "telegram"
    }

    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        parse_mode: ParseMode,
    ) -> AppResult<SentMessage> {
        let mut body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });
        if parse_mode == ParseMode::Markdown {
            body["parse_mode"] = "Markdown".into();
        }

        let message: TelegramMessage = self.call("sendMessage", &body).await?;
        Ok(SentMessage {
            chat_id: message.chat.id,
            message_id: message.message_id,
        })
    }

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> AppResult<()> {
        let _: bool = self
            .call(
                "deleteMessage",
                &serde_json::json!({ "chat_id": chat_id, "message_id": message_id }),
            )
            .await?;
        Ok(())
    }

    async fn send_typing(&self, chat_id: i64) -> AppResult<()> {
        let _: bool = self
            .call(
                "sendChatAction",
                &serde_json::json!({ "chat_id": chat_id, "action": "typing" }),
            )
            .await?;
        Ok(())
    }
}

// --- Telegram API Types ---

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramUpdate {
    pub update_id: i64,
    pub message: Option<TelegramMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramMessage {
    pub message_id: i64,
    pub from: Option<TelegramUser>,
    pub chat: TelegramChat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramUser {
    pub is_bot: bool,
    pub first_name: String,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramChat {
    pub id: i64,
}

impl TelegramUpdate {
    /// Messages from human senders. A message without text (photo, sticker)
    /// arrives with empty text so the sender is asked for a question.
    /// Updates that carry no message and bot messages are dropped.
    pub fn into_incoming(self) -> Option<IncomingMessage> {
        let message = self.message?;

        if message.from.as_ref().is_some_and(|from| from.is_bot) {
            return None;
        }

        Some(IncomingMessage {
            chat_id: message.chat.id,
            message_id: message.message_id,
            text: message.text.unwrap_or_default(),
            sender: message.from.and_then(|from| from.username),
        })
    }
}
