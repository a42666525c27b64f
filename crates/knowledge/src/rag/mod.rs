//! Question answering over retrieved documents.
//!
//! Keyword extraction, retrieval, and answer synthesis, each stage with a
//! fixed fallback so the pipeline always produces a reply.

pub mod ask;
pub mod types;

pub use ask::AnswerSynthesizer;
pub use types::{SynthesisOptions, ANSWER_ERROR, NO_CONTEXT, PIPELINE_ERROR};
