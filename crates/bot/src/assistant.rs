//! The question answering pipeline, wired from configuration.

use kbot_core::{AppResult, BotConfig};
use kbot_knowledge::{
    AnswerSynthesizer, DocumentStore, KnowledgeRetriever, NotionClient, RetrievedDocument,
    RetrieverConfig, SynthesisOptions,
};
use kbot_llm::{create_client, LlmClient};
use kbot_prompt::{load_prompt_set, PromptSet};
use std::sync::Arc;

/// Retriever and synthesizer bound to a result limit.
pub struct Assistant {
    retriever: KnowledgeRetriever,
    synthesizer: AnswerSynthesizer,
    max_results: usize,
}

impl Assistant {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        llm: Arc<dyn LlmClient>,
        prompts: PromptSet,
        config: &BotConfig,
    ) -> Self {
        Self {
            retriever: KnowledgeRetriever::new(store, RetrieverConfig::from(config)),
            synthesizer: AnswerSynthesizer::new(llm, prompts, SynthesisOptions::from(config)),
            max_results: config.max_search_results,
        }
    }

    /// Build the production pipeline: Notion store, OpenAI-compatible model,
    /// built-in or overridden prompts.
    pub fn from_config(config: &BotConfig) -> AppResult<Self> {
        let prompts = load_prompt_set(config.prompts_dir.as_deref())?;
        let store = Arc::new(NotionClient::new(config.notion_api_key.clone()));
        let llm = create_client(config);

        tracing::debug!(
            "Pipeline ready (model: {}, max results: {})",
            config.model,
            config.max_search_results
        );

        Ok(Self::new(store, llm, prompts, config))
    }

    /// Answer a question. Always yields reply text.
    pub async fn answer(&self, question: &str) -> String {
        self.synthesizer
            .answer(question, |keywords| async move {
                self.retriever.search(&keywords, self.max_results).await
            })
            .await
    }

    /// Every document in the knowledge base.
    pub async fn all_documents(&self) -> AppResult<Vec<RetrievedDocument>> {
        self.retriever.all_documents().await
    }
}
