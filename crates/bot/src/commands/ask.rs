//! Ask command handler.
//!
//! Runs one question through the answer pipeline and prints the reply.

use crate::assistant::Assistant;
use clap::Args;
use kbot_core::{AppError, AppResult, BotConfig};

/// Answer a single question from the knowledge base
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    #[arg(required = true, num_args = 1..)]
    pub question: Vec<String>,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &BotConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let question = self.question();
        if question.is_empty() {
            return Err(AppError::Config("No question provided".to_string()));
        }

        let assistant = Assistant::from_config(config)?;
        let answer = assistant.answer(&question).await;

        println!("{}", answer);
        Ok(())
    }

    /// Words joined back into one question.
    fn question(&self) -> String {
        self.question.join(" ").trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_words_are_joined() {
        let cmd = AskCommand {
            question: vec!["How".into(), "do".into(), "I".into(), "reset?".into()],
        };
        assert_eq!(cmd.question(), "How do I reset?");
    }

    #[tokio::test]
    async fn test_blank_question_is_rejected() {
        let cmd = AskCommand {
            question: vec!["  ".into()],
        };
        let result = cmd.execute(&BotConfig::default()).await;
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
