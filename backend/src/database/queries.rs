//! Database query functions (Data Access Objects).
//!
//! This module centralizes all direct Postgres operations behind the store
//! traits, so handlers and services never see SQL. Migrations from
//! `backend/migrations` are applied when the pool is created, before any request
//! is served.
//!
//! Mutations that read before they write (`update_*`) lock the row with
//! `SELECT ... FOR UPDATE` inside a transaction so concurrent partial updates
//! do not overwrite each other's fields.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;

use super::models::{
    ArticlePatch, KnowledgeArticle, NewArticle, NewTicket, NewUser, Ticket, TicketPatch, User,
    UserId, DEFAULT_TICKET_STATUS,
};
use super::{ArticleStore, Page, Store, StoreError, StoreResult, TicketStore, UserStore};
use crate::config::DatabaseConfig;

const TICKET_COLUMNS: &str = "id, title, description, status, created_at, updated_at";
const ARTICLE_COLUMNS: &str = "id, title, content, category, author_id, created_at";
const USER_COLUMNS: &str = "id, username, password_hash, created_at";

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn connect(config: &DatabaseConfig) -> StoreResult<Self> {
        // Avoid logging `config.url`; it may carry credentials.
        let options = PgConnectOptions::from_str(&config.url)?;
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_millis(config.acquire_timeout_ms))
            .connect_with(options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!(max_connections = config.max_connections, "postgres store ready");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn has_code(err: &sqlx::Error, code: &str) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|c| c == code)
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    has_code(err, "23505")
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    has_code(err, "23503")
}

#[async_trait]
impl TicketStore for PostgresStore {
    async fn list_tickets(&self) -> StoreResult<Vec<Ticket>> {
        let rows = sqlx::query_as::<_, Ticket>(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn create_ticket(&self, ticket: NewTicket) -> StoreResult<Ticket> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, Ticket>(&format!(
            "INSERT INTO tickets (title, description, status, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $4) RETURNING {TICKET_COLUMNS}"
        ))
        .bind(&ticket.title)
        .bind(&ticket.description)
        .bind(DEFAULT_TICKET_STATUS)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get_ticket(&self, id: i64) -> StoreResult<Ticket> {
        sqlx::query_as::<_, Ticket>(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound("ticket".into()))
    }

    async fn update_ticket(&self, id: i64, patch: TicketPatch) -> StoreResult<Ticket> {
        let mut tx = self.pool.begin().await?;
        let mut ticket = sqlx::query_as::<_, Ticket>(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| StoreError::NotFound("ticket".into()))?;

        ticket.apply(patch, Utc::now());

        let updated = sqlx::query_as::<_, Ticket>(&format!(
            "UPDATE tickets SET title = $1, description = $2, status = $3, updated_at = $4
             WHERE id = $5 RETURNING {TICKET_COLUMNS}"
        ))
        .bind(&ticket.title)
        .bind(&ticket.description)
        .bind(&ticket.status)
        .bind(ticket.updated_at)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(updated)
    }
}

#[async_trait]
impl ArticleStore for PostgresStore {
    async fn create_article(&self, article: NewArticle) -> StoreResult<KnowledgeArticle> {
        let inserted = sqlx::query_as::<_, KnowledgeArticle>(&format!(
            "INSERT INTO knowledge_articles (title, content, category, author_id, created_at)
             VALUES ($1, $2, $3, $4, $5) RETURNING {ARTICLE_COLUMNS}"
        ))
        .bind(&article.title)
        .bind(&article.content)
        .bind(&article.category)
        .bind(article.author_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await;
        match inserted {
            Ok(row) => Ok(row),
            Err(err) if is_foreign_key_violation(&err) => {
                Err(StoreError::NotFound("author".into()))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn get_article(&self, id: i64) -> StoreResult<KnowledgeArticle> {
        sqlx::query_as::<_, KnowledgeArticle>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM knowledge_articles WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound("article".into()))
    }

    async fn update_article(&self, id: i64, patch: ArticlePatch) -> StoreResult<KnowledgeArticle> {
        let mut tx = self.pool.begin().await?;
        let mut article = sqlx::query_as::<_, KnowledgeArticle>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM knowledge_articles WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| StoreError::NotFound("article".into()))?;

        article.apply(patch);

        let updated = sqlx::query_as::<_, KnowledgeArticle>(&format!(
            "UPDATE knowledge_articles SET title = $1, content = $2, category = $3
             WHERE id = $4 RETURNING {ARTICLE_COLUMNS}"
        ))
        .bind(&article.title)
        .bind(&article.content)
        .bind(&article.category)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_article(&self, id: i64) -> StoreResult<()> {
        let removed = sqlx::query("DELETE FROM knowledge_articles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if removed.rows_affected() == 0 {
            return Err(StoreError::NotFound("article".into()));
        }
        Ok(())
    }

    async fn list_articles(&self, offset: u64, limit: u64) -> StoreResult<Page<KnowledgeArticle>> {
        let items = sqlx::query_as::<_, KnowledgeArticle>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM knowledge_articles
             ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2"
        ))
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await?;
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM knowledge_articles")
            .fetch_one(&self.pool)
            .await?;
        Ok(Page {
            items,
            total: total.max(0) as u64,
        })
    }
}

#[async_trait]
impl UserStore for PostgresStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let inserted = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, password_hash, created_at)
             VALUES ($1, $2, $3) RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await;
        match inserted {
            Ok(row) => Ok(row),
            Err(err) if is_unique_violation(&err) => {
                Err(StoreError::Conflict("username taken".into()))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get_user(&self, id: UserId) -> StoreResult<User> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound("user".into()))
    }
}

#[async_trait]
impl Store for PostgresStore {
    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
