//! Pages command handler.
//!
//! Lists every page in the knowledge base database.

use crate::assistant::Assistant;
use clap::Args;
use kbot_core::{AppResult, BotConfig};
use kbot_knowledge::RetrievedDocument;

/// List all pages in the knowledge base
#[derive(Args, Debug)]
pub struct PagesCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl PagesCommand {
    /// Execute the pages command.
    pub async fn execute(&self, config: &BotConfig) -> AppResult<()> {
        tracing::info!("Executing pages command");

        let assistant = Assistant::from_config(config)?;
        let documents = assistant.all_documents().await?;

        println!("{}", self.render(&documents)?);
        Ok(())
    }

    fn render(&self, documents: &[RetrievedDocument]) -> AppResult<String> {
        if self.json {
            return Ok(serde_json::to_string_pretty(documents)?);
        }

        if documents.is_empty() {
            return Ok("No pages found in the knowledge base.".to_string());
        }

        let mut lines = vec![format!("{} page(s):", documents.len())];
        lines.extend(
            documents
                .iter()
                .map(|doc| format!("- {} ({})", doc.title, doc.url)),
        );
        Ok(lines.join("\n"))
    }
}
