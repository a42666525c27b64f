//! Error types for kbot.
//!
//! This module defines a unified error enum that covers all error categories
//! in the bot: configuration, I/O, language model, retrieval, prompt, and
//! chat transport errors.

use thiserror::Error;

/// Unified error type for kbot.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Required configuration values that were not provided
    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingConfig(Vec<String>),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Language model provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Document store query errors
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Chat transport errors (send, delete, polling)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_lists_names() {
        let err = AppError::MissingConfig(vec![
            "TELEGRAM_BOT_TOKEN".to_string(),
            "OPENAI_API_KEY".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Missing required environment variables: TELEGRAM_BOT_TOKEN, OPENAI_API_KEY"
        );
    }

    #[test]
    fn test_json_error_conversion() {
        let parse = serde_json::from_str::<serde_json::Value>("{not json");
        let err: AppError = parse.unwrap_err().into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
