//! Custom error types specific to the `adapters` crate.
//!
//! This module defines errors that can occur while talking to a search engine:
//! transport failures, unexpected HTTP statuses, missing documents and response
//! bodies that do not decode, giving the backend one error type for every
//! `SearchIndex` implementation.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search engine request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("search engine returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("document {0} is not indexed")]
    NotFound(i64),
    #[error("cannot decode search engine response: {0}")]
    Decode(String),
    #[error("results past hit {max} cannot be paged to (requested offset {from})")]
    ResultWindow { from: usize, max: usize },
}

impl SearchError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// The query asked for a page deeper than the engine will serve.
    pub fn is_result_window(&self) -> bool {
        matches!(self, Self::ResultWindow { .. })
    }
}

pub type SearchResult<T> = Result<T, SearchError>;
