//! In-process implementation of the `SearchIndex` trait.
//!
//! Documents live in a `HashMap` guarded by `tokio::sync::RwLock`. Ranking is
//! plain term frequency over lowercased title and content tokens, which is
//! enough for local development and tests without a running search engine.
//! Nothing is persisted.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::errors::{SearchError, SearchResult};
use crate::models::{ArticleDocument, IndexOutcome, SearchHits, SearchQuery};
use crate::SearchIndex;

#[derive(Clone, Default)]
pub struct MemoryIndex {
    docs: Arc<RwLock<HashMap<i64, ArticleDocument>>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.docs.read().await.len()
    }

    pub async fn contains(&self, id: i64) -> bool {
        self.docs.read().await.contains_key(&id)
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
}

fn score(doc: &ArticleDocument, terms: &[String]) -> usize {
    tokenize(&doc.title)
        .chain(tokenize(&doc.content))
        .filter(|token| terms.contains(token))
        .count()
}

#[async_trait]
impl SearchIndex for MemoryIndex {
    async fn ensure_index(&self) -> SearchResult<()> {
        Ok(())
    }

    async fn index_article(&self, doc: &ArticleDocument) -> SearchResult<IndexOutcome> {
        let previous = self.docs.write().await.insert(doc.id, doc.clone());
        Ok(match previous {
            Some(_) => IndexOutcome::Updated,
            None => IndexOutcome::Created,
        })
    }

    async fn search_articles(&self, query: &SearchQuery) -> SearchResult<SearchHits> {
        let mut terms: Vec<String> = tokenize(&query.text).collect();
        terms.sort();
        terms.dedup();

        let docs = self.docs.read().await;
        let mut ranked: Vec<(usize, &ArticleDocument)> = docs
            .values()
            .map(|doc| (score(doc, &terms), doc))
            .filter(|(score, _)| terms.is_empty() || *score > 0)
            .collect();
        ranked.sort_by(|(a_score, a), (b_score, b)| b_score.cmp(a_score).then(b.id.cmp(&a.id)));

        let total = ranked.len() as u64;
        let hits = ranked
            .into_iter()
            .skip(query.from)
            .take(query.size)
            .map(|(_, doc)| doc.clone())
            .collect();
        Ok(SearchHits { total, hits })
    }

    async fn delete_article(&self, id: i64) -> SearchResult<()> {
        match self.docs.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(SearchError::NotFound(id)),
        }
    }

    async fn health_check(&self) -> SearchResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
