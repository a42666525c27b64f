//! Command handlers for the kbot CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod ask;
pub mod pages;
pub mod run;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use pages::PagesCommand;
pub use run::RunCommand;
