//! Chat gateway: routes inbound messages to static replies or the
//! answer pipeline and posts the results back.

pub mod commands;
pub mod split;
pub mod telegram;
pub mod transport;

pub use commands::BotCommand;
pub use telegram::TelegramClient;
pub use transport::{ChatTransport, IncomingMessage, ParseMode, SentMessage};

use crate::assistant::Assistant;
use commands::{EMPTY_QUESTION_TEXT, FAILURE_TEXT, SEARCHING_TEXT};
use kbot_core::AppResult;
use split::{split_message, MAX_MESSAGE_LENGTH};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::Instrument;

/// Routes chat messages through the assistant.
pub struct ChatGateway {
    transport: Arc<dyn ChatTransport>,
    assistant: Assistant,
}

/// How far a question got before something failed.
#[derive(Debug, Default)]
struct Progress {
    /// The "searching" notice, once posted
    transient: Option<SentMessage>,

    /// Whether the notice has already been removed
    cleaned_up: bool,
}

impl ChatGateway {
    pub fn new(transport: Arc<dyn ChatTransport>, assistant: Assistant) -> Self {
        Self {
            transport,
            assistant,
        }
    }

    /// Handle messages until `shutdown` resolves or the inbound channel closes.
    ///
    /// Each message runs in its own task; in-flight tasks are not awaited on
    /// shutdown.
    pub async fn run<S>(self: Arc<Self>, mut inbound: mpsc::Receiver<IncomingMessage>, shutdown: S)
    where
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        tracing::info!(
            "Listening for messages on {}",
            self.transport.transport_name()
        );

        loop {
            let message = tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested, no longer accepting messages");
                    break;
                }
                message = inbound.recv() => match message {
                    Some(message) => message,
                    None => {
                        tracing::info!("Inbound channel closed");
                        break;
                    }
                },
            };

            let span = tracing::info_span!(
                "message",
                chat_id = message.chat_id,
                message_id = message.message_id
            );
            let gateway = Arc::clone(&self);
            tokio::spawn(async move { gateway.handle(message).await }.instrument(span));
        }
    }

    /// Handle one inbound message. Errors are reported to the chat, never
    /// returned.
    pub async fn handle(&self, message: IncomingMessage) {
        tracing::debug!(
            "Received message from {}",
            message.sender.as_deref().unwrap_or("unknown")
        );

        if let Some(command) = BotCommand::parse(&message.text) {
            tracing::info!("Command: {:?}", command);
            if let Err(e) = self
                .transport
                .send_message(message.chat_id, command.reply(), command.parse_mode())
                .await
            {
                tracing::error!("Failed to reply to {:?}: {}", command, e);
            }
            return;
        }

        let question = message.text.trim();
        if question.is_empty() {
            if let Err(e) = self
                .transport
                .send_message(message.chat_id, EMPTY_QUESTION_TEXT, ParseMode::Plain)
                .await
            {
                tracing::error!("Failed to send empty-question reply: {}", e);
            }
            return;
        }

        let mut progress = Progress::default();
        if let Err(e) = self.answer_question(&message, question, &mut progress).await {
            tracing::error!("Error processing message: {}", e);
            self.report_failure(&message, &progress).await;
        }
    }

    async fn answer_question(
        &self,
        message: &IncomingMessage,
        question: &str,
        progress: &mut Progress,
    ) -> AppResult<()> {
        let chat_id = message.chat_id;
        tracing::info!("Question: {}", question);

        if let Err(e) = self.transport.send_typing(chat_id).await {
            tracing::debug!("Typing indicator failed: {}", e);
        }

        let notice = self
            .transport
            .send_message(chat_id, SEARCHING_TEXT, ParseMode::Plain)
            .await?;
        progress.transient = Some(notice);

        let answer = self.assistant.answer(question).await;

        self.transport
            .delete_message(notice.chat_id, notice.message_id)
            .await?;
        progress.cleaned_up = true;

        let chunks = split_message(&answer, MAX_MESSAGE_LENGTH);
        tracing::debug!("Sending answer in {} message(s)", chunks.len());
        for chunk in chunks {
            self.transport
                .send_message(chat_id, &chunk, ParseMode::Markdown)
                .await?;
        }

        Ok(())
    }

    /// Remove the searching notice (or the question, if no notice was
    /// posted) and tell the user something went wrong.
    async fn report_failure(&self, message: &IncomingMessage, progress: &Progress) {
        if !progress.cleaned_up {
            let (chat_id, message_id) = match progress.transient {
                Some(notice) => (notice.chat_id, notice.message_id),
                None => (message.chat_id, message.message_id),
            };
            if let Err(e) = self.transport.delete_message(chat_id, message_id).await {
                tracing::warn!("Failed to delete message {}: {}", message_id, e);
            }
        }

        if let Err(e) = self
            .transport
            .send_message(message.chat_id, FAILURE_TEXT, ParseMode::Plain)
            .await
        {
            tracing::error!("Failed to send failure notice: {}", e);
        }
    }
}
