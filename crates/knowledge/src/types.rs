//! Core types for the knowledge layer.

use kbot_core::{BotConfig, SearchProperty};
use serde::{Deserialize, Serialize};

/// A database page flattened into text, ready to be used as model context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    /// Page identifier in the document store
    pub id: String,

    /// Extracted page title, or "Untitled"
    pub title: String,

    /// Page content rendered as Markdown
    pub body: String,

    /// Link back to the page
    pub url: String,
}

/// A page returned by a database query.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRecord {
    pub id: String,
    pub url: String,

    /// Raw property map, keyed by property name
    pub properties: serde_json::Map<String, serde_json::Value>,
}

/// One page of database query results.
#[derive(Debug, Clone, Default)]
pub struct QueryPage {
    pub results: Vec<PageRecord>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

/// Parameters for a single database query call.
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseQuery {
    /// Compound filter object, or `None` for every page
    pub filter: Option<serde_json::Value>,

    /// Maximum results per call (1..=100)
    pub page_size: usize,

    /// Continuation cursor from a previous call
    pub start_cursor: Option<String>,
}

/// A content block in a page's block tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: String,

    /// Block type (e.g., "paragraph", "heading_1", "code")
    pub kind: String,

    /// Whether the store holds nested blocks under this one
    pub has_children: bool,

    /// Type-specific payload (the object stored under the `kind` key)
    pub data: serde_json::Value,

    /// Nested blocks, filled in by the retriever
    pub children: Vec<Block>,
}

impl Block {
    /// Parse a block object as returned by the store's children endpoint.
    pub fn from_value(mut value: serde_json::Value) -> Option<Self> {
        let id = value.get("id")?.as_str()?.to_string();
        let kind = value.get("type")?.as_str()?.to_string();
        let has_children = value
            .get("has_children")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        let data = value
            .get_mut(&kind)
            .map(serde_json::Value::take)
            .unwrap_or(serde_json::Value::Null);

        Some(Self {
            id,
            kind,
            has_children,
            data,
            children: Vec::new(),
        })
    }
}

/// One page of child blocks.
#[derive(Debug, Clone, Default)]
pub struct BlockPage {
    pub results: Vec<Block>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

/// Retriever settings, fixed at startup.
#[derive(Debug, Clone)]
pub struct RetrieverConfig {
    /// Database that holds the knowledge base pages
    pub database_id: String,

    /// Candidate title properties, in priority order
    pub title_properties: Vec<String>,

    /// Properties OR-ed together in the keyword filter
    pub search_properties: Vec<SearchProperty>,
}

impl From<&BotConfig> for RetrieverConfig {
    fn from(config: &BotConfig) -> Self {
        Self {
            database_id: config.notion_database_id.clone(),
            title_properties: config.title_properties.clone(),
            search_properties: config.search_properties.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_block_from_value() {
        let block = Block::from_value(json!({
            "object": "block",
            "id": "b1",
            "type": "heading_2",
            "has_children": false,
            "heading_2": {"rich_text": [{"plain_text": "Steps"}]}
        }))
        .unwrap();

        assert_eq!(block.kind, "heading_2");
        assert_eq!(block.data["rich_text"][0]["plain_text"], "Steps");
        assert!(!block.has_children);
    }

    #[test]
    fn test_block_without_type_is_skipped() {
        assert!(Block::from_value(json!({"id": "b1"})).is_none());
    }

    #[test]
    fn test_retriever_config_from_bot_config() {
        let bot = BotConfig {
            notion_database_id: "db-1".to_string(),
            ..BotConfig::default()
        };
        let config = RetrieverConfig::from(&bot);
        assert_eq!(config.database_id, "db-1");
        assert_eq!(config.title_properties, vec!["title", "Name", "Title"]);
    }
}
