//! Document store abstraction.

use crate::types::{BlockPage, DatabaseQuery, QueryPage};
use kbot_core::AppResult;

/// A hosted document database: filterable page queries plus per-page
/// block content.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Store name for logging (e.g., "notion").
    fn store_name(&self) -> &str;

    /// Run one page of a database query.
    async fn query_database(&self, database_id: &str, query: &DatabaseQuery)
        -> AppResult<QueryPage>;

    /// Fetch one page of a block's children.
    async fn block_children(&self, block_id: &str, start_cursor: Option<&str>)
        -> AppResult<BlockPage>;
}
