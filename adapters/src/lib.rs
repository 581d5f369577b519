//! Core `adapters` crate for abstracting search-engine interactions.
//!
//! This crate defines the `SearchIndex` trait, which outlines the operations the
//! knowledge base needs from a full-text engine (upsert by id, multi-field
//! keyword search, delete by id), and provides the concrete implementations:
//! Elasticsearch over its REST API and an in-process index for local runs and tests.

pub mod elasticsearch;
pub mod errors;
pub mod memory;
pub mod models;

use async_trait::async_trait;

pub use elasticsearch::ElasticsearchIndex;
pub use errors::{SearchError, SearchResult};
pub use memory::MemoryIndex;
pub use models::{ArticleDocument, IndexOutcome, SearchHits, SearchQuery};

#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Create the index if the engine does not have it yet.
    async fn ensure_index(&self) -> SearchResult<()>;

    /// Insert or overwrite the document stored under `doc.id`.
    async fn index_article(&self, doc: &ArticleDocument) -> SearchResult<IndexOutcome>;

    /// Rank documents against `query` over title and content.
    async fn search_articles(&self, query: &SearchQuery) -> SearchResult<SearchHits>;

    /// Remove the document stored under `id`.
    ///
    /// Returns `SearchError::NotFound` when nothing was indexed under that id.
    async fn delete_article(&self, id: i64) -> SearchResult<()>;

    async fn health_check(&self) -> SearchResult<()>;

    fn backend_name(&self) -> &'static str;
}
