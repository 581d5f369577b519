//! Elasticsearch-specific implementation of the `SearchIndex` trait.
//!
//! This file contains the REST client wrapper, request body construction and
//! response decoding for an Elasticsearch (or API-compatible OpenSearch) cluster.
//! Documents are keyed by article id so re-indexing an article overwrites it.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::{SearchError, SearchResult};
use crate::models::{ArticleDocument, IndexOutcome, SearchHits, SearchQuery, SEARCH_FIELDS};
use crate::SearchIndex;

/// Elasticsearch's default `index.max_result_window`.
pub const DEFAULT_MAX_RESULT_WINDOW: usize = 10_000;

pub struct ElasticsearchIndex {
    client: Client,
    base_url: String,
    index: String,
    max_result_window: usize,
}

/// How a `from`/`size` request fits the engine's result window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Window {
    Fits,
    /// Starts inside the window; `size` must shrink to the given value.
    Clamp(usize),
    /// Starts at or past the window.
    Beyond,
}

pub(crate) fn result_window(from: usize, size: usize, max: usize) -> Window {
    if from.saturating_add(size) <= max {
        Window::Fits
    } else if from < max {
        Window::Clamp(max - from)
    } else {
        Window::Beyond
    }
}

#[derive(Debug, Deserialize)]
struct IndexResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
struct HitsEnvelope {
    total: TotalHits,
    hits: Vec<Hit>,
}

/// `hits.total` is an object since 7.0 and a bare number before it.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TotalHits {
    Object { value: u64 },
    Count(u64),
}

impl TotalHits {
    fn value(&self) -> u64 {
        match self {
            Self::Object { value } => *value,
            Self::Count(value) => *value,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_source")]
    source: ArticleDocument,
}

impl ElasticsearchIndex {
    pub fn new(base_url: &str, index: &str) -> SearchResult<Self> {
        let client = Client::builder().build()?;
        Ok(Self::with_client(client, base_url, index))
    }

    pub fn with_client(client: Client, base_url: &str, index: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            index: index.to_string(),
            max_result_window: DEFAULT_MAX_RESULT_WINDOW,
        }
    }

    /// Overrides the result window for indices created with a custom
    /// `index.max_result_window`.
    pub fn with_max_result_window(mut self, max: usize) -> Self {
        self.max_result_window = max;
        self
    }

    pub fn index_name(&self) -> &str {
        &self.index
    }

    fn index_url(&self) -> String {
        format!("{}/{}", self.base_url, self.index)
    }

    fn doc_url(&self, id: i64) -> String {
        format!("{}/{}/_doc/{}", self.base_url, self.index, id)
    }

    async fn run_search(&self, query: &SearchQuery) -> SearchResult<SearchHits> {
        let response = self
            .client
            .post(format!("{}/_search", self.index_url()))
            .json(&search_body(query))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        let body: Value = response.json().await?;
        parse_search_response(body)
    }
}

/// Reads the body of a non-success response into a `SearchError::Status`.
async fn status_error(response: reqwest::Response) -> SearchError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    SearchError::Status { status, body }
}

/// Mappings applied when the index is created.
pub(crate) fn index_mappings() -> Value {
    json!({
        "mappings": {
            "properties": {
                "id": { "type": "long" },
                "title": { "type": "text" },
                "content": { "type": "text" },
                "category": { "type": "keyword" },
                "author_id": { "type": "long" },
                "created_at": { "type": "date" }
            }
        }
    })
}

/// Builds the `_search` body for a keyword query.
pub(crate) fn search_body(query: &SearchQuery) -> Value {
    let clause = if query.is_blank() {
        json!({ "match_all": {} })
    } else {
        json!({
            "multi_match": {
                "query": query.text,
                "fields": SEARCH_FIELDS,
            }
        })
    };
    json!({
        "from": query.from,
        "size": query.size,
        "track_total_hits": true,
        "query": clause,
    })
}

pub(crate) fn parse_search_response(body: Value) -> SearchResult<SearchHits> {
    let response: SearchResponse =
        serde_json::from_value(body).map_err(|err| SearchError::Decode(err.to_string()))?;
    Ok(SearchHits {
        total: response.hits.total.value(),
        hits: response.hits.hits.into_iter().map(|hit| hit.source).collect(),
    })
}

pub(crate) fn parse_index_outcome(body: Value) -> SearchResult<IndexOutcome> {
    let response: IndexResponse =
        serde_json::from_value(body).map_err(|err| SearchError::Decode(err.to_string()))?;
    match response.result.as_str() {
        "created" => Ok(IndexOutcome::Created),
        "updated" | "noop" => Ok(IndexOutcome::Updated),
        other => Err(SearchError::Decode(format!("unexpected index result {other}"))),
    }
}

#[async_trait]
impl SearchIndex for ElasticsearchIndex {
    async fn ensure_index(&self) -> SearchResult<()> {
        let response = self.client.head(self.index_url()).send().await?;
        if response.status().is_success() {
            return Ok(());
        }
        if response.status() != StatusCode::NOT_FOUND {
            return Err(status_error(response).await);
        }

        log::info!("creating search index {}", self.index);
        let response = self
            .client
            .put(self.index_url())
            .json(&index_mappings())
            .send()
            .await?;
        if response.status().is_success() {
            return Ok(());
        }
        let err = status_error(response).await;
        // Another instance may have created it between the HEAD and the PUT.
        if let SearchError::Status { status: 400, body } = &err {
            if body.contains("resource_already_exists_exception") {
                return Ok(());
            }
        }
        Err(err)
    }

    async fn index_article(&self, doc: &ArticleDocument) -> SearchResult<IndexOutcome> {
        let response = self
            .client
            .put(self.doc_url(doc.id))
            .query(&[("refresh", "wait_for")])
            .json(doc)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        let body: Value = response.json().await?;
        let outcome = parse_index_outcome(body)?;
        log::debug!("indexed article {} ({})", doc.id, outcome.as_str());
        Ok(outcome)
    }

    async fn search_articles(&self, query: &SearchQuery) -> SearchResult<SearchHits> {
        match result_window(query.from, query.size, self.max_result_window) {
            Window::Fits => self.run_search(query).await,
            Window::Clamp(size) => {
                let clamped = SearchQuery {
                    size,
                    ..query.clone()
                };
                self.run_search(&clamped).await
            }
            Window::Beyond => {
                // Only the total is needed to tell an empty tail from a page
                // the engine refuses to serve.
                let counted = SearchQuery {
                    from: 0,
                    size: 0,
                    ..query.clone()
                };
                let total = self.run_search(&counted).await?.total;
                if query.from as u64 >= total {
                    return Ok(SearchHits {
                        total,
                        hits: Vec::new(),
                    });
                }
                log::debug!(
                    "search offset {} exceeds result window {}",
                    query.from,
                    self.max_result_window
                );
                Err(SearchError::ResultWindow {
                    from: query.from,
                    max: self.max_result_window,
                })
            }
        }
    }

    async fn delete_article(&self, id: i64) -> SearchResult<()> {
        let response = self
            .client
            .delete(self.doc_url(id))
            .query(&[("refresh", "wait_for")])
            .send()
            .await?;
        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(SearchError::NotFound(id)),
            _ => Err(status_error(response).await),
        }
    }

    async fn health_check(&self) -> SearchResult<()> {
        let response = self
            .client
            .get(format!("{}/_cluster/health", self.base_url))
            .send()
            .await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(status_error(response).await)
        }
    }

    fn backend_name(&self) -> &'static str {
        "elasticsearch"
    }
}
