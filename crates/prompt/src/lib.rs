//! Prompt system for kbot.
//!
//! This crate provides structured prompt management with:
//! - Built-in keyword and answer templates
//! - YAML overrides loaded from a prompts directory
//! - Handlebars template rendering

pub mod builder;
pub mod builtin;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use builtin::{builtin_prompt, ANSWER_PROMPT_ID, KEYWORDS_PROMPT_ID};
pub use loader::{load_prompt, load_prompt_set};
pub use types::{BuiltPrompt, BuiltPromptMetadata, PromptDefinition, PromptSet};
