//! Answer synthesis.
//!
//! Reduces a question to search keywords, runs the caller's retrieval, and
//! asks the model to answer from the retrieved documents.

use crate::rag::types::{SynthesisOptions, ANSWER_ERROR, NO_CONTEXT, PIPELINE_ERROR};
use crate::types::RetrievedDocument;
use kbot_core::AppResult;
use kbot_llm::{LlmClient, LlmRequest};
use kbot_prompt::{build_prompt, PromptDefinition, PromptSet};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

/// Runs the keyword and answer prompts against a model.
pub struct AnswerSynthesizer {
    llm: Arc<dyn LlmClient>,
    prompts: PromptSet,
    options: SynthesisOptions,
}

impl AnswerSynthesizer {
    pub fn new(llm: Arc<dyn LlmClient>, prompts: PromptSet, options: SynthesisOptions) -> Self {
        Self {
            llm,
            prompts,
            options,
        }
    }

    /// Extract search keywords from a question.
    ///
    /// Falls back to the question itself if the model fails or returns
    /// nothing.
    pub async fn extract_keywords(&self, question: &str) -> String {
        let variables = HashMap::from([("question".to_string(), question.to_string())]);

        match self.run(&self.prompts.keywords, variables).await {
            Ok(keywords) if !keywords.is_empty() => keywords,
            Ok(_) => {
                tracing::warn!("Model returned no keywords, searching with the question");
                question.to_string()
            }
            Err(e) => {
                tracing::error!("Error generating search keywords: {}", e);
                question.to_string()
            }
        }
    }

    /// Answer a question from the given documents.
    ///
    /// Returns the fixed apology if the model fails or returns nothing.
    pub async fn synthesize_answer(&self, question: &str, documents: &[RetrievedDocument]) -> String {
        let variables = HashMap::from([
            ("question".to_string(), question.to_string()),
            ("context".to_string(), build_context(documents)),
        ]);

        match self.run(&self.prompts.answer, variables).await {
            Ok(answer) if !answer.is_empty() => answer,
            Ok(_) => {
                tracing::warn!("Model returned an empty answer");
                ANSWER_ERROR.to_string()
            }
            Err(e) => {
                tracing::error!("Error generating answer: {}", e);
                ANSWER_ERROR.to_string()
            }
        }
    }

    /// Full pipeline: keywords, retrieval, answer.
    ///
    /// Never fails; a retrieval error yields the generic apology.
    pub async fn answer<F, Fut>(&self, question: &str, retrieve: F) -> String
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = AppResult<Vec<RetrievedDocument>>>,
    {
        let keywords = self.extract_keywords(question).await;
        tracing::info!("Search keywords: {}", keywords);

        let documents = match retrieve(keywords).await {
            Ok(documents) => documents,
            Err(e) => {
                tracing::error!("Error processing question: {}", e);
                return PIPELINE_ERROR.to_string();
            }
        };
        tracing::info!("Found {} relevant pages", documents.len());

        self.synthesize_answer(question, &documents).await
    }

    /// Render a prompt, send it, and return the trimmed completion.
    async fn run(
        &self,
        definition: &PromptDefinition,
        variables: HashMap<String, String>,
    ) -> AppResult<String> {
        let built = build_prompt(definition, variables)?;

        let mut request = LlmRequest::new(built.user, &self.options.model)
            .with_temperature(self.options.temperature);
        if let Some(system) = built.system {
            request = request.with_system(system);
        }

        tracing::debug!(
            "Running prompt {} with {} (model: {})",
            built.metadata.source_prompt_id,
            self.llm.provider_name(),
            self.options.model
        );

        let response = self.llm.complete(&request).await?;
        Ok(response.content.trim().to_string())
    }
}

/// Format documents as the model's context section.
pub fn build_context(documents: &[RetrievedDocument]) -> String {
    if documents.is_empty() {
        return NO_CONTEXT.to_string();
    }

    documents
        .iter()
        .enumerate()
        .map(|(i, doc)| {
            format!(
                "**Page {}: {}**\nURL: {}\n\n{}\n\n---\n",
                i + 1,
                doc.title,
                doc.url,
                doc.body
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeLlm;
    use kbot_core::AppError;
    use kbot_prompt::load_prompt_set;

    fn options() -> SynthesisOptions {
        SynthesisOptions {
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.3,
        }
    }

    fn synthesizer(llm: Arc<FakeLlm>) -> AnswerSynthesizer {
        AnswerSynthesizer::new(llm, load_prompt_set(None).unwrap(), options())
    }

    fn doc(title: &str, body: &str) -> RetrievedDocument {
        RetrievedDocument {
            id: title.to_lowercase(),
            title: title.to_string(),
            body: body.to_string(),
            url: format!("https://www.notion.so/{}", title.replace(' ', "-")),
        }
    }

    #[tokio::test]
    async fn test_extract_keywords_trims_output() {
        let llm = Arc::new(FakeLlm::replying("  password reset \n"));
        let keywords = synthesizer(llm.clone())
            .extract_keywords("How do I reset my password?")
            .await;

        assert_eq!(keywords, "password reset");
        let requests = llm.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].prompt.contains("How do I reset my password?"));
        assert_eq!(requests[0].model, "gpt-3.5-turbo");
        assert_eq!(requests[0].temperature, Some(0.3));
    }

    #[tokio::test]
    async fn test_extract_keywords_falls_back_on_error() {
        let llm = Arc::new(FakeLlm::failing());
        let keywords = synthesizer(llm).extract_keywords("vpn setup").await;
        assert_eq!(keywords, "vpn setup");
    }

    #[tokio::test]
    async fn test_extract_keywords_falls_back_on_empty_output() {
        let llm = Arc::new(FakeLlm::replying("   "));
        let keywords = synthesizer(llm).extract_keywords("vpn setup").await;
        assert_eq!(keywords, "vpn setup");
    }

    #[test]
    fn test_build_context() {
        let context = build_context(&[doc("Password Policy", "Rotate."), doc("Account Setup", "SSO.")]);

        assert_eq!(
            context,
            "**Page 1: Password Policy**\nURL: https://www.notion.so/Password-Policy\n\nRotate.\n\n---\n\
             \n**Page 2: Account Setup**\nURL: https://www.notion.so/Account-Setup\n\nSSO.\n\n---\n"
        );
    }

    #[test]
    fn test_build_context_empty() {
        assert_eq!(build_context(&[]), NO_CONTEXT);
    }

    #[tokio::test]
    async fn test_synthesize_answer_error_returns_apology() {
        let llm = Arc::new(FakeLlm::failing());
        let answer = synthesizer(llm).synthesize_answer("q", &[doc("A", "b")]).await;
        assert_eq!(answer, ANSWER_ERROR);
    }

    #[tokio::test]
    async fn test_synthesize_answer_without_documents() {
        let llm = Arc::new(FakeLlm::replying("Nothing on that."));
        let answer = synthesizer(llm.clone()).synthesize_answer("q", &[]).await;

        assert_eq!(answer, "Nothing on that.");
        assert!(llm.requests()[0].prompt.contains(NO_CONTEXT));
    }

    #[tokio::test]
    async fn test_answer_retrieval_error_returns_pipeline_apology() {
        let llm = Arc::new(FakeLlm::replying("keywords"));
        let answer = synthesizer(llm.clone())
            .answer("q", |_| async {
                Err(AppError::Retrieval("database unreachable".to_string()))
            })
            .await;

        assert_eq!(answer, PIPELINE_ERROR);
        // Only the keyword prompt ran.
        assert_eq!(llm.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_answer_passes_keywords_to_retrieval() {
        let llm = Arc::new(FakeLlm::scripted("password reset", "Use the portal."));
        let seen = std::sync::Mutex::new(None);

        let answer = synthesizer(llm)
            .answer("How do I reset my password?", |keywords| {
                *seen.lock().unwrap() = Some(keywords);
                async { Ok(vec![doc("Password Policy", "Use the portal.")]) }
            })
            .await;

        assert_eq!(answer, "Use the portal.");
        assert_eq!(seen.lock().unwrap().as_deref(), Some("password reset"));
    }
}
