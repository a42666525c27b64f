//! Fixed texts produced by the answer pipeline.

/// Context rendered when retrieval found no documents.
pub const NO_CONTEXT: &str = "No relevant information found in the knowledge base.";

/// Reply when answer synthesis fails.
pub const ANSWER_ERROR: &str =
    "Sorry, I encountered an error while processing your question. Please try again.";

/// Reply when retrieval fails.
pub const PIPELINE_ERROR: &str =
    "Sorry, I encountered an error while processing your question. Please try again later.";

/// Model settings shared by both pipeline stages.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisOptions {
    /// Model identifier (e.g., "gpt-3.5-turbo")
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,
}

impl From<&kbot_core::BotConfig> for SynthesisOptions {
    fn from(config: &kbot_core::BotConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
        }
    }
}
