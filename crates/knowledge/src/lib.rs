//! Knowledge base retrieval and question answering.
//!
//! Searches a hosted document database by keyword, renders the matching
//! pages as Markdown, and synthesizes answers from them with an LLM.

pub mod markdown;
pub mod notion;
pub mod rag;
pub mod retriever;
pub mod store;
pub mod title;
pub mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use notion::NotionClient;
pub use rag::{AnswerSynthesizer, SynthesisOptions};
pub use retriever::{KnowledgeRetriever, CONTENT_PLACEHOLDER};
pub use store::DocumentStore;
pub use types::{RetrievedDocument, RetrieverConfig};
