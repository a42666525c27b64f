//! Chat transport abstraction.

use kbot_core::AppResult;

/// An inbound chat message, already filtered to text from a human sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub chat_id: i64,
    pub message_id: i64,
    pub text: String,

    /// Sender's username, when they have one
    pub sender: Option<String>,
}

/// A message the bot has posted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentMessage {
    pub chat_id: i64,
    pub message_id: i64,
}

/// How the chat service should interpret outgoing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    Plain,
    Markdown,
}

/// Outbound operations the gateway needs from a chat service.
#[async_trait::async_trait]
pub trait ChatTransport: Send + Sync {
    /// Transport name for logging (e.g., "telegram").
    fn transport_name(&self) -> &str;

    /// Post a message to a chat.
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        parse_mode: ParseMode,
    ) -> AppResult<SentMessage>;

    /// Remove a message from a chat.
    async fn delete_message(&self, chat_id: i64, message_id: i64) -> AppResult<()>;

    /// Show the "typing" indicator in a chat.
    async fn send_typing(&self, chat_id: i64) -> AppResult<()>;
}
