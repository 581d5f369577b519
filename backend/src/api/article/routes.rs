//! Defines the HTTP routes of the knowledge base under `/api/kb`.

use axum::routing::get;
use axum::Router;

use super::handlers::{
    create_article, delete_article, get_article, list_articles, search_articles, update_article,
};
use crate::app::AppState;

pub fn article_router() -> Router<AppState> {
    Router::new()
        .route("/api/kb", get(list_articles).post(create_article))
        .route("/api/kb/", get(list_articles).post(create_article))
        .route("/api/kb/search", get(search_articles))
        .route(
            "/api/kb/:id",
            get(get_article).put(update_article).delete(delete_article),
        )
}
