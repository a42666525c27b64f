//! Slash commands with static replies.

use crate::gateway::transport::ParseMode;

/// Commands answered without touching the knowledge base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Help,
    Status,
}

impl BotCommand {
    /// Match message text against the known commands.
    ///
    /// Only the exact command text matches; `/help me` or `/START` do not.
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "/start" => Some(Self::Start),
            "/help" => Some(Self::Help),
            "/status" => Some(Self::Status),
            _ => None,
        }
    }

    pub fn reply(&self) -> &'static str {
        match self {
            Self::Start => WELCOME_TEXT,
            Self::Help => HELP_TEXT,
            Self::Status => STATUS_TEXT,
        }
    }

    pub fn parse_mode(&self) -> ParseMode {
        match self {
            Self::Start | Self::Help => ParseMode::Markdown,
            Self::Status => ParseMode::Plain,
        }
    }
}

const WELCOME_TEXT: &str = r#"🤖 *Welcome to the Notion Knowledge Bot!*

I can help you search and find information from your Notion database.

*Available commands:*
• Just type your question to search the knowledge base
• /help - Show this help message
• /status - Check bot status

*How to use:*
Simply ask me any question, and I'll search through your Notion database to find relevant information and provide you with a comprehensive answer.

Example: "How do I reset my password?""#;

const HELP_TEXT: &str = r#"*How to use this bot:*

🔍 *Search your knowledge base:*
Simply type your question, and I'll search through your Notion database to find relevant information.

📝 *Examples of questions you can ask:*
• "How do I configure the API?"
• "What is the company policy on remote work?"
• "Where can I find the installation guide?"

⚡ *Available commands:*
• /start - Welcome message
• /help - Show this help
• /status - Check if the bot is working

The bot uses AI to understand your questions and find the most relevant information from your Notion database."#;

const STATUS_TEXT: &str = "✅ Bot is running and ready to help!";

/// Reply to empty or whitespace-only messages.
pub const EMPTY_QUESTION_TEXT: &str =
    "Please send me a question to search for in your knowledge base.";

/// Transient message shown while a question is processed.
pub const SEARCHING_TEXT: &str = "🔍 Searching your knowledge base...";

/// Reply when handling a question fails.
pub const FAILURE_TEXT: &str =
    "❌ Sorry, I encountered an error while processing your request. Please try again.";
