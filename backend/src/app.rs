//! HTTP application wiring.
//!
//! Builds the shared `AppState` from configuration and composes the ticket,
//! knowledge-base and auth routers into one Axum router. Every handle a
//! handler needs (store, search index, token service) is constructed here once
//! and reaches handlers through `State`.

use std::sync::Arc;

use adapters::{ElasticsearchIndex, MemoryIndex, SearchIndex};
use anyhow::Context;
use axum::routing::get;
use axum::Router;

use crate::api;
use crate::auth::{self, AuthService};
use crate::config::AppConfig;
use crate::database::{MemoryStore, PostgresStore, Store};
use crate::middleware;
use crate::services::KnowledgeBase;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub search: Arc<dyn SearchIndex>,
    pub knowledge_base: KnowledgeBase,
    pub auth: AuthService,
    pub articles_per_page: u32,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        search: Arc<dyn SearchIndex>,
        auth: AuthService,
        articles_per_page: u32,
    ) -> Self {
        Self {
            knowledge_base: KnowledgeBase::new(store.clone(), search.clone()),
            store,
            search,
            auth,
            articles_per_page,
        }
    }
}

pub async fn build_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let store: Arc<dyn Store> = match &config.database {
        Some(database) => Arc::new(
            PostgresStore::connect(database)
                .await
                .context("connect to postgres")?,
        ),
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    let search: Arc<dyn SearchIndex> = match &config.search.url {
        Some(url) => Arc::new(
            ElasticsearchIndex::new(url, &config.search.index)
                .context("build elasticsearch client")?,
        ),
        None => {
            tracing::warn!("ELASTICSEARCH_URL not set; using in-memory search index");
            Arc::new(MemoryIndex::new())
        }
    };
    search
        .ensure_index()
        .await
        .with_context(|| format!("prepare search index {}", config.search.index))?;

    tracing::info!(
        store = store.backend_name(),
        search = search.backend_name(),
        "backends ready"
    );
    Ok(AppState::new(
        store,
        search,
        AuthService::new(&config.auth),
        config.articles_per_page,
    ))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(api::system::health))
        .merge(auth::auth_router())
        .merge(api::ticket::routes::ticket_router())
        .merge(api::article::routes::article_router())
        .layer(middleware::trace_layer())
        .with_state(state)
}
