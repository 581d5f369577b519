//! Generic data models for the `adapters` crate.
//!
//! These models define the shape of knowledge-base articles as they live inside
//! a search index, independent of the engine holding them. The backend converts
//! its store rows into these before mirroring and reads them back out of search
//! hits, so every `SearchIndex` implementation speaks the same format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Denormalized copy of a knowledge-base article held by the search index.
///
/// Serializes with the same field names as the backend's article record so
/// search hits can be returned to clients as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleDocument {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub category: String,
    pub author_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Result reported by the engine after an index (upsert) call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOutcome {
    Created,
    Updated,
}

impl IndexOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
        }
    }
}

/// A multi-field keyword query over article titles and contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Free text; blank text matches every document.
    pub text: String,
    /// Number of ranked hits to skip.
    pub from: usize,
    /// Maximum number of hits to return.
    pub size: usize,
}

impl SearchQuery {
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// One page of ranked hits plus the total number of matches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchHits {
    pub total: u64,
    pub hits: Vec<ArticleDocument>,
}

/// Fields covered by keyword search, in the order they are queried.
pub const SEARCH_FIELDS: [&str; 2] = ["title", "content"];
