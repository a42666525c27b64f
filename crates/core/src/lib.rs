//! kbot core library
//!
//! Foundational utilities shared by every kbot crate:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Configuration management

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::{BotConfig, PropertyKind, SearchProperty, Secret};
pub use error::{AppError, AppResult};
