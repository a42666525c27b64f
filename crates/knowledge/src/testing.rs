//! In-memory fakes for the model and the document store.
//!
//! Compiled for this crate's tests and, with the `test-support` feature,
//! for downstream crates' tests.

use crate::store::DocumentStore;
use crate::types::{Block, BlockPage, DatabaseQuery, PageRecord, QueryPage};
use kbot_core::{AppError, AppResult};
use kbot_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

type Responder = Box<dyn Fn(&LlmRequest) -> AppResult<String> + Send + Sync>;

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Model fake that answers through a closure and records every request.
pub struct FakeLlm {
    responder: Responder,
    requests: Mutex<Vec<LlmRequest>>,
}

impl FakeLlm {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&LlmRequest) -> AppResult<String> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Reply with the same text to every prompt.
    pub fn replying(text: &str) -> Self {
        let text = text.to_string();
        Self::new(move |_| Ok(text.clone()))
    }

    /// Fail every request.
    pub fn failing() -> Self {
        Self::new(|_| Err(AppError::Llm("model unavailable".to_string())))
    }

    /// Reply with `keywords` to the keyword prompt and `answer` to anything else.
    pub fn scripted(keywords: &str, answer: &str) -> Self {
        let keywords = keywords.to_string();
        let answer = answer.to_string();
        Self::new(move |request| {
            if request.prompt.trim_end().ends_with("Keywords:") {
                Ok(keywords.clone())
            } else {
                Ok(answer.clone())
            }
        })
    }

    /// Requests received so far, in order.
    pub fn requests(&self) -> Vec<LlmRequest> {
        locked(&self.requests).clone()
    }
}

#[async_trait::async_trait]
impl LlmClient for FakeLlm {
    fn provider_name(&self) -> &str {
        "fake"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        locked(&self.requests).push(request.clone());
        let content = (self.responder)(request)?;

        Ok(LlmResponse {
            content,
            model: request.model.clone(),
            usage: LlmUsage::default(),
        })
    }
}

/// Document store fake holding pages and block trees in memory.
///
/// Query cursors are result offsets rendered as strings.
#[derive(Default)]
pub struct FakeStore {
    pages: Vec<PageRecord>,
    blocks: HashMap<String, Vec<Block>>,
    failing_blocks: HashSet<String>,
    fail_queries: bool,
    query_page_size: Option<usize>,
    queries: Mutex<Vec<(String, DatabaseQuery)>>,
}

impl FakeStore {
    /// Add a page with its top-level blocks.
    pub fn with_page(mut self, page: PageRecord, blocks: Vec<Block>) -> Self {
        self.blocks.insert(page.id.clone(), blocks);
        self.pages.push(page);
        self
    }

    /// Set the children of a nested block.
    pub fn with_children(mut self, block_id: &str, children: Vec<Block>) -> Self {
        self.blocks.insert(block_id.to_string(), children);
        self
    }

    /// Make content fetches for `block_id` fail.
    pub fn failing_content(mut self, block_id: &str) -> Self {
        self.failing_blocks.insert(block_id.to_string());
        self
    }

    /// Make every database query fail.
    pub fn failing_queries(mut self) -> Self {
        self.fail_queries = true;
        self
    }

    /// Cap results per query call regardless of the requested page size.
    pub fn with_query_page_size(mut self, size: usize) -> Self {
        self.query_page_size = Some(size);
        self
    }

    /// Database queries received so far, in order.
    pub fn queries(&self) -> Vec<(String, DatabaseQuery)> {
        locked(&self.queries).clone()
    }
}

#[async_trait::async_trait]
impl DocumentStore for FakeStore {
    fn store_name(&self) -> &str {
        "fake"
    }

    async fn query_database(
        &self,
        database_id: &str,
        query: &DatabaseQuery,
    ) -> AppResult<QueryPage> {
        locked(&self.queries).push((database_id.to_string(), query.clone()));

        if self.fail_queries {
            return Err(AppError::Retrieval("unauthorized".to_string()));
        }

        let start = query
            .start_cursor
            .as_deref()
            .and_then(|c| c.parse::<usize>().ok())
            .unwrap_or(0);
        let size = self.query_page_size.unwrap_or(query.page_size);
        let end = (start + size).min(self.pages.len());
        let has_more = end < self.pages.len();

        Ok(QueryPage {
            results: self.pages.get(start..end).unwrap_or_default().to_vec(),
            next_cursor: has_more.then(|| end.to_string()),
            has_more,
        })
    }

    async fn block_children(
        &self,
        block_id: &str,
        _start_cursor: Option<&str>,
    ) -> AppResult<BlockPage> {
        if self.failing_blocks.contains(block_id) {
            return Err(AppError::Retrieval(format!("block {} not found", block_id)));
        }

        Ok(BlockPage {
            results: self.blocks.get(block_id).cloned().unwrap_or_default(),
            next_cursor: None,
            has_more: false,
        })
    }
}

/// A page whose `Name` title property holds `title`.
pub fn page(id: &str, title: &str) -> PageRecord {
    let properties = json!({
        "Name": {"type": "title", "title": [{"plain_text": title}]}
    });

    PageRecord {
        id: id.to_string(),
        url: format!("https://www.notion.so/{}", id),
        properties: properties.as_object().cloned().unwrap_or_default(),
    }
}

/// A paragraph block holding `text`.
pub fn paragraph(text: &str) -> Block {
    Block {
        id: format!("blk-{}", text),
        kind: "paragraph".to_string(),
        has_children: false,
        data: json!({"rich_text": [{"plain_text": text}]}),
        children: Vec::new(),
    }
}
