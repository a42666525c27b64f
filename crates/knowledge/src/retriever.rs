//! Knowledge retriever: keyword search over the document store.
//!
//! Turns matching database pages into [`RetrievedDocument`]s. Query-level
//! failures fail the whole search; a page whose content cannot be converted
//! keeps its place in the results with a placeholder body.

use crate::markdown::blocks_to_markdown;
use crate::notion::MAX_PAGE_SIZE;
use crate::store::DocumentStore;
use crate::title::extract_title;
use crate::types::{Block, DatabaseQuery, PageRecord, RetrievedDocument, RetrieverConfig};
use futures::future::BoxFuture;
use futures::FutureExt;
use kbot_core::{AppError, AppResult};
use serde_json::{json, Value};
use std::sync::Arc;

/// Body substituted when a page's content cannot be fetched or converted.
pub const CONTENT_PLACEHOLDER: &str = "Failed to retrieve content";

/// Deepest level of nested blocks fetched below a page.
const MAX_BLOCK_DEPTH: usize = 4;

/// Keyword retriever over a document database.
pub struct KnowledgeRetriever {
    store: Arc<dyn DocumentStore>,
    config: RetrieverConfig,
}

impl KnowledgeRetriever {
    pub fn new(store: Arc<dyn DocumentStore>, config: RetrieverConfig) -> Self {
        Self { store, config }
    }

    /// Build the OR filter matching `keywords` against every search property.
    pub fn build_filter(&self, keywords: &str) -> Value {
        let clauses: Vec<Value> = self
            .config
            .search_properties
            .iter()
            .map(|prop| {
                json!({
                    "property": prop.name,
                    prop.kind.as_str(): { "contains": keywords },
                })
            })
            .collect();

        json!({ "or": clauses })
    }

    /// Search the database for pages matching `keywords`.
    ///
    /// Returns at most `max_results` documents in store order.
    pub async fn search(
        &self,
        keywords: &str,
        max_results: usize,
    ) -> AppResult<Vec<RetrievedDocument>> {
        tracing::info!("Searching {} for: {}", self.store.store_name(), keywords);

        let query = DatabaseQuery {
            filter: Some(self.build_filter(keywords)),
            page_size: max_results.clamp(1, MAX_PAGE_SIZE),
            start_cursor: None,
        };

        let page = self
            .store
            .query_database(&self.config.database_id, &query)
            .await
            .map_err(|e| {
                tracing::error!("Error searching database: {}", e);
                AppError::Retrieval(format!("Failed to search knowledge base: {}", e))
            })?;

        let records: Vec<PageRecord> = page.results.into_iter().take(max_results).collect();
        let documents = self.to_documents(records).await;

        tracing::info!("Found {} relevant pages", documents.len());
        Ok(documents)
    }

    /// Fetch every page in the database, following pagination.
    pub async fn all_documents(&self) -> AppResult<Vec<RetrievedDocument>> {
        let mut records = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let query = DatabaseQuery {
                filter: None,
                page_size: MAX_PAGE_SIZE,
                start_cursor: cursor.take(),
            };

            let page = self
                .store
                .query_database(&self.config.database_id, &query)
                .await
                .map_err(|e| {
                    tracing::error!("Error retrieving all pages: {}", e);
                    AppError::Retrieval(format!("Failed to retrieve pages: {}", e))
                })?;

            records.extend(page.results);

            match page.next_cursor {
                Some(next) if page.has_more => cursor = Some(next),
                _ => break,
            }
        }

        tracing::info!("Retrieved {} pages from database", records.len());
        Ok(self.to_documents(records).await)
    }

    async fn to_documents(&self, records: Vec<PageRecord>) -> Vec<RetrievedDocument> {
        let mut documents = Vec::with_capacity(records.len());

        for record in records {
            let title = extract_title(&record.properties, &self.config.title_properties);
            let body = self.page_content(&record.id).await;

            documents.push(RetrievedDocument {
                id: record.id,
                title,
                body,
                url: record.url,
            });
        }

        documents
    }

    /// Page content as Markdown, or the placeholder on failure.
    async fn page_content(&self, page_id: &str) -> String {
        match self.fetch_blocks(page_id.to_string(), 0).await {
            Ok(blocks) => blocks_to_markdown(&blocks),
            Err(e) => {
                tracing::warn!("Error converting page {} to markdown: {}", page_id, e);
                CONTENT_PLACEHOLDER.to_string()
            }
        }
    }

    /// Fetch all children of a block, recursing into nested blocks.
    fn fetch_blocks(&self, block_id: String, depth: usize) -> BoxFuture<'_, AppResult<Vec<Block>>> {
        async move {
            let mut blocks = Vec::new();
            let mut cursor: Option<String> = None;

            loop {
                let page = self
                    .store
                    .block_children(&block_id, cursor.as_deref())
                    .await?;
                blocks.extend(page.results);

                match page.next_cursor {
                    Some(next) if page.has_more => cursor = Some(next),
                    _ => break,
                }
            }

            if depth + 1 < MAX_BLOCK_DEPTH {
                for block in blocks.iter_mut().filter(|b| descends_into(b)) {
                    block.children = self.fetch_blocks(block.id.clone(), depth + 1).await?;
                }
            }

            Ok(blocks)
        }
        .boxed()
    }
}

/// Child pages and databases are separate documents, not nested content.
fn descends_into(block: &Block) -> bool {
    block.has_children && !matches!(block.kind.as_str(), "child_page" | "child_database")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{page, paragraph, FakeStore};
    use kbot_core::{PropertyKind, SearchProperty};

    fn config() -> RetrieverConfig {
        RetrieverConfig {
            database_id: "db-1".to_string(),
            title_properties: kbot_core::config::default_title_properties(),
            search_properties: kbot_core::config::default_search_properties(),
        }
    }

    fn retriever(store: FakeStore) -> (KnowledgeRetriever, Arc<FakeStore>) {
        let store = Arc::new(store);
        (KnowledgeRetriever::new(store.clone(), config()), store)
    }

    #[test]
    fn test_build_filter() {
        let (retriever, _) = retriever(FakeStore::default());
        let filter = retriever.build_filter("password reset");

        assert_eq!(
            filter,
            json!({"or": [
                {"property": "title", "rich_text": {"contains": "password reset"}},
                {"property": "Name", "title": {"contains": "password reset"}}
            ]})
        );
    }

    #[test]
    fn test_build_filter_custom_properties() {
        let store: Arc<dyn DocumentStore> = Arc::new(FakeStore::default());
        let retriever = KnowledgeRetriever::new(
            store,
            RetrieverConfig {
                search_properties: vec![SearchProperty::new("Page", PropertyKind::Title)],
                ..config()
            },
        );
        let filter = retriever.build_filter("vpn");
        assert_eq!(filter["or"].as_array().unwrap().len(), 1);
        assert_eq!(filter["or"][0]["title"]["contains"], "vpn");
    }

    #[tokio::test]
    async fn test_search_converts_pages() {
        let store = FakeStore::default()
            .with_page(page("p1", "Password Policy"), vec![paragraph("Rotate every 90 days.")])
            .with_page(page("p2", "Account Setup"), vec![paragraph("Use SSO.")]);
        let (retriever, store) = retriever(store);

        let docs = retriever.search("password", 5).await.unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].title, "Password Policy");
        assert_eq!(docs[0].body, "Rotate every 90 days.");
        assert_eq!(docs[0].url, "https://www.notion.so/p1");
        assert_eq!(docs[1].title, "Account Setup");

        let queries = store.queries();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].0, "db-1");
        assert_eq!(queries[0].1.page_size, 5);
        assert!(queries[0].1.filter.is_some());
    }

    #[tokio::test]
    async fn test_search_caps_results() {
        let mut store = FakeStore::default();
        for i in 0..4 {
            store = store.with_page(page(&format!("p{}", i), "Doc"), vec![]);
        }
        let (retriever, _) = retriever(store);

        let docs = retriever.search("doc", 2).await.unwrap();
        assert_eq!(docs.len(), 2);
    }

    #[tokio::test]
    async fn test_content_failure_uses_placeholder() {
        let store = FakeStore::default()
            .with_page(page("p1", "Broken"), vec![])
            .with_page(page("p2", "Fine"), vec![paragraph("ok")])
            .failing_content("p1");
        let (retriever, _) = retriever(store);

        let docs = retriever.search("x", 5).await.unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].body, CONTENT_PLACEHOLDER);
        assert_eq!(docs[1].body, "ok");
    }

    #[tokio::test]
    async fn test_query_failure_is_retrieval_error() {
        let (retriever, _) = retriever(FakeStore::default().failing_queries());

        let result = retriever.search("anything", 5).await;
        assert!(matches!(result, Err(AppError::Retrieval(_))));
    }

    #[tokio::test]
    async fn test_nested_blocks_are_fetched() {
        let mut parent = paragraph("Steps:");
        parent.has_children = true;
        let store = FakeStore::default()
            .with_page(page("p1", "Guide"), vec![parent.clone()])
            .with_children(&parent.id, vec![paragraph("Open settings")]);
        let (retriever, _) = retriever(store);

        let docs = retriever.search("guide", 5).await.unwrap();
        assert_eq!(docs[0].body, "Steps:\n    Open settings");
    }

    #[tokio::test]
    async fn test_all_documents_follows_pagination() {
        let mut store = FakeStore::default().with_query_page_size(2);
        for i in 0..5 {
            store = store.with_page(page(&format!("p{}", i), &format!("Doc {}", i)), vec![]);
        }
        let (retriever, store) = retriever(store);

        let docs = retriever.all_documents().await.unwrap();

        assert_eq!(docs.len(), 5);
        assert_eq!(docs[4].title, "Doc 4");
        let queries = store.queries();
        assert_eq!(queries.len(), 3);
        assert!(queries.iter().all(|(_, q)| q.filter.is_none()));
        assert_eq!(queries[1].1.start_cursor.as_deref(), Some("2"));
    }
}
