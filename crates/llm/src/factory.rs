//! LLM client construction from bot configuration.

use crate::client::LlmClient;
use crate::providers::OpenAiClient;
use kbot_core::BotConfig;
use std::sync::Arc;

/// Create the chat completion client described by `config`.
///
/// Any OpenAI-compatible endpoint works; `llm_base_url` selects it.
pub fn create_client(config: &BotConfig) -> Arc<dyn LlmClient> {
    tracing::debug!("Creating LLM client for {}", config.llm_base_url);

    Arc::new(OpenAiClient::with_base_url(
        config.openai_api_key.clone(),
        config.llm_base_url.clone(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kbot_core::Secret;

    #[test]
    fn test_create_client_from_config() {
        let config = BotConfig {
            openai_api_key: Secret::new("sk-test"),
            ..BotConfig::default()
        };
        let client = create_client(&config);
        assert_eq!(client.provider_name(), "openai");
    }
}
