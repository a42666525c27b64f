//! Notion implementation of the document store.
//!
//! Notion API: https://developers.notion.com/reference

use crate::store::DocumentStore;
use crate::types::{Block, BlockPage, DatabaseQuery, PageRecord, QueryPage};
use kbot_core::{AppError, AppResult, Secret};
use serde::{Deserialize, Serialize};

/// Default API base URL.
pub const NOTION_API_URL: &str = "https://api.notion.com/v1";

/// API version pinned in every request.
pub const NOTION_VERSION: &str = "2022-06-28";

/// Largest page size the API accepts.
pub const MAX_PAGE_SIZE: usize = 100;

/// Database query request body.
#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<&'a serde_json::Value>,
    page_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_cursor: Option<&'a str>,
}

/// Paginated list envelope shared by query and children endpoints.
#[derive(Debug, Deserialize)]
struct ListResponse {
    results: Vec<serde_json::Value>,
    #[serde(default)]
    next_cursor: Option<String>,
    #[serde(default)]
    has_more: bool,
}

/// Raw object from a database query.
#[derive(Debug, Deserialize)]
struct RawPage {
    object: String,
    id: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    properties: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Error envelope returned on non-2xx responses.
#[derive(Debug, Deserialize)]
struct NotionError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// Notion API client.
pub struct NotionClient {
    /// Base URL for the API
    base_url: String,

    /// Integration token
    api_key: Secret,

    /// HTTP client
    client: reqwest::Client,
}

impl NotionClient {
    /// Create a client for the public Notion API.
    pub fn new(api_key: Secret) -> Self {
        Self::with_base_url(api_key, NOTION_API_URL)
    }

    /// Create a client against a custom base URL.
    pub fn with_base_url(api_key: Secret, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            client: reqwest::Client::new(),
        }
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .bearer_auth(self.api_key.expose())
            .header("Notion-Version", NOTION_VERSION)
    }

    /// Send a request and decode the list envelope, mapping API errors.
    async fn send_list(&self, request: reqwest::RequestBuilder) -> AppResult<ListResponse> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| AppError::Retrieval(format!("Failed to reach Notion: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(api_error(status, &text));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Retrieval(format!("Failed to parse Notion response: {}", e)))
    }
}

/// Map a non-2xx response to a retrieval error, preferring the
/// `{code, message}` envelope over the raw body.
fn api_error(status: reqwest::StatusCode, body: &str) -> AppError {
    let detail = match serde_json::from_str::<NotionError>(body) {
        Ok(err) if !err.code.is_empty() || !err.message.is_empty() => {
            format!("{}: {}", err.code, err.message)
        }
        _ => body.trim().to_string(),
    };
    AppError::Retrieval(format!("Notion API error ({}): {}", status, detail))
}

/// Keep page objects that carry properties; skip anything else.
fn convert_pages(results: Vec<serde_json::Value>) -> Vec<PageRecord> {
    results
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<RawPage>(value) {
            Ok(raw) if raw.object == "page" => raw.properties.map(|properties| PageRecord {
                id: raw.id,
                url: raw.url.unwrap_or_default(),
                properties,
            }),
            Ok(raw) => {
                tracing::debug!("Skipping non-page result {} ({})", raw.id, raw.object);
                None
            }
            Err(e) => {
                tracing::warn!("Skipping malformed query result: {}", e);
                None
            }
        })
        .collect()
}

#[async_trait::async_trait]
impl DocumentStore for NotionClient {
    fn store_name(&self) -> &str {
        "notion"
    }

    async fn query_database(
        &self,
        database_id: &str,
        query: &DatabaseQuery,
    ) -> AppResult<QueryPage> {
        let url = format!("{}/databases/{}/query", self.base_url, database_id);
        let body = QueryRequest {
            filter: query.filter.as_ref(),
            page_size: query.page_size.clamp(1, MAX_PAGE_SIZE),
            start_cursor: query.start_cursor.as_deref(),
        };

        tracing::debug!("Querying database {} (page_size: {})", database_id, body.page_size);

        let list = self.send_list(self.client.post(&url).json(&body)).await?;

        Ok(QueryPage {
            results: convert_pages(list.results),
            next_cursor: list.next_cursor,
            has_more: list.has_more,
        })
    }

    async fn block_children(
        &self,
        block_id: &str,
        start_cursor: Option<&str>,
    ) -> AppResult<BlockPage> {
        let url = format!("{}/blocks/{}/children", self.base_url, block_id);
        let mut params = vec![("page_size", MAX_PAGE_SIZE.to_string())];
        if let Some(cursor) = start_cursor {
            params.push(("start_cursor", cursor.to_string()));
        }

        let list = self.send_list(self.client.get(&url).query(&params)).await?;

        Ok(BlockPage {
            results: list.results.into_iter().filter_map(Block::from_value).collect(),
            next_cursor: list.next_cursor,
            has_more: list.has_more,
        })
    }
}
