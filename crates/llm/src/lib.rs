//! LLM integration crate for kbot.
//!
//! Provides a provider-agnostic completion trait and an OpenAI-compatible
//! implementation of it.
//!
//! # Example
//! ```no_run
//! use kbot_core::Secret;
//! use kbot_llm::{LlmClient, LlmRequest, OpenAiClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OpenAiClient::new(Secret::new("sk-..."));
//! let request = LlmRequest::new("Hello, world!", "gpt-3.5-turbo");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::OpenAiClient;
