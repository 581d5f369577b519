//! Module for database connection setup and common utilities.
//!
//! This module defines the store traits the handlers depend on, the shared
//! `StoreError` type, and the two backends: Postgres through `sqlx` for real
//! deployments and an in-memory store used when no database is configured.

pub mod memory;
pub mod models;
pub mod queries;

use async_trait::async_trait;
use thiserror::Error;

use models::{
    ArticlePatch, KnowledgeArticle, NewArticle, NewTicket, NewUser, Ticket, TicketPatch, User,
    UserId,
};

pub use memory::MemoryStore;
pub use queries::PostgresStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// One page of rows plus the total row count before paging.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

#[async_trait]
pub trait TicketStore: Send + Sync {
    async fn list_tickets(&self) -> StoreResult<Vec<Ticket>>;
    async fn create_ticket(&self, ticket: NewTicket) -> StoreResult<Ticket>;
    async fn get_ticket(&self, id: i64) -> StoreResult<Ticket>;
    async fn update_ticket(&self, id: i64, patch: TicketPatch) -> StoreResult<Ticket>;
}

#[async_trait]
pub trait ArticleStore: Send + Sync {
    async fn create_article(&self, article: NewArticle) -> StoreResult<KnowledgeArticle>;
    async fn get_article(&self, id: i64) -> StoreResult<KnowledgeArticle>;
    async fn update_article(&self, id: i64, patch: ArticlePatch) -> StoreResult<KnowledgeArticle>;
    async fn delete_article(&self, id: i64) -> StoreResult<()>;
    /// Newest first (`created_at DESC, id DESC`).
    async fn list_articles(&self, offset: u64, limit: u64) -> StoreResult<Page<KnowledgeArticle>>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    async fn get_user(&self, id: UserId) -> StoreResult<User>;
}

#[async_trait]
pub trait Store: TicketStore + ArticleStore + UserStore {
    async fn health_check(&self) -> StoreResult<()>;
    fn backend_name(&self) -> &'static str;
}
