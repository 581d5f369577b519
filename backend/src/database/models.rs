//! Rust structs that represent database table mappings.
//!
//! These models define the structure of tickets, knowledge-base articles and
//! users as they are stored in and retrieved from the database. Request bodies
//! live next to their handlers; the `New*` and `*Patch` types here are the
//! already-validated inputs the store accepts.

use adapters::ArticleDocument;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const TICKET_TITLE_MAX: usize = 100;
pub const TICKET_STATUS_MAX: usize = 20;
pub const DEFAULT_TICKET_STATUS: &str = "Open";

pub const ARTICLE_TITLE_MAX: usize = 200;
pub const ARTICLE_CATEGORY_MAX: usize = 50;

/// Opaque user identifier; article ownership is equality on this type.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct UserId(pub i64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Ticket {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct TicketPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

impl Ticket {
    /// Applies the supplied fields and advances `updated_at` without ever moving it backwards.
    pub fn apply(&mut self, patch: TicketPatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        self.updated_at = now.max(self.updated_at);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct KnowledgeArticle {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub category: String,
    pub author_id: UserId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    pub content: String,
    pub category: String,
    pub author_id: UserId,
}

#[derive(Debug, Clone, Default)]
pub struct ArticlePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
}

impl ArticlePatch {
    /// Rejects supplied fields that are blank or too long.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(title) = &self.title {
            check_text("title", title, Some(ARTICLE_TITLE_MAX))?;
        }
        if let Some(content) = &self.content {
            check_text("content", content, None)?;
        }
        if let Some(category) = &self.category {
            check_text("category", category, Some(ARTICLE_CATEGORY_MAX))?;
        }
        Ok(())
    }
}

impl KnowledgeArticle {
    pub fn is_authored_by(&self, user: UserId) -> bool {
        self.author_id == user
    }

    pub fn apply(&mut self, patch: ArticlePatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
    }

    /// Copy mirrored into the search index.
    pub fn to_document(&self) -> ArticleDocument {
        ArticleDocument {
            id: self.id,
            title: self.title.clone(),
            content: self.content.clone(),
            category: self.category.clone(),
            author_id: self.author_id.0,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
}

/// Shared text check: non-blank and, when `max` is set, at most `max` characters.
pub fn check_text(field: &str, value: &str, max: Option<usize>) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} must not be empty"));
    }
    if let Some(max) = max {
        if value.chars().count() > max {
            return Err(format!("{field} must be at most {max} characters"));
        }
    }
    Ok(())
}
