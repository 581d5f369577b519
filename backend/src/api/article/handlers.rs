//! Request handlers for knowledge-base articles.
//!
//! Handlers translate HTTP input into `KnowledgeBase` calls; the service owns
//! the ownership checks and the store/index dual write. Protected handlers take
//! `AuthUser` before the body so unauthenticated requests fail with 401 first,
//! and bodies are taken as `Result` so decode failures answer in the API's
//! error shape.

use adapters::ArticleDocument;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::api::pagination::{paginate, Envelope, PageRequest};
use crate::api::required_text;
use crate::app::AppState;
use crate::auth::AuthUser;
use crate::database::models::{
    ArticlePatch, KnowledgeArticle, NewArticle, ARTICLE_CATEGORY_MAX, ARTICLE_TITLE_MAX,
};
use crate::errors::ApiError;
use crate::services::KbError;

#[derive(Debug, Deserialize)]
pub struct CreateArticleRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateArticleRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub page: Option<String>,
}

pub async fn create_article(
    State(state): State<AppState>,
    caller: AuthUser,
    payload: Result<Json<CreateArticleRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = payload?;
    let article = NewArticle {
        title: required_text("title", body.title, Some(ARTICLE_TITLE_MAX))?,
        content: required_text("content", body.content, None)?,
        category: required_text("category", body.category, Some(ARTICLE_CATEGORY_MAX))?,
        author_id: caller.user_id,
    };
    let created = state.knowledge_base.create(article).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_article(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<KnowledgeArticle>, ApiError> {
    Ok(Json(state.knowledge_base.get(id).await?))
}

pub async fn update_article(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    caller: AuthUser,
    payload: Result<Json<UpdateArticleRequest>, JsonRejection>,
) -> Result<Json<KnowledgeArticle>, ApiError> {
    let patch = payload
        .map(|Json(body)| ArticlePatch {
            title: body.title,
            content: body.content,
            category: body.category,
        })
        .map_err(|rejection| KbError::Validation(rejection.body_text()));
    let updated = state
        .knowledge_base
        .update(caller.user_id, id, patch)
        .await?;
    Ok(Json(updated))
}

pub async fn delete_article(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<StatusCode, ApiError> {
    state.knowledge_base.delete(caller.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn search_articles(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Envelope<ArticleDocument>>, ApiError> {
    let request = PageRequest::parse(params.page.as_deref(), state.articles_per_page)?;
    let text = params.q.unwrap_or_default();
    let hits = state
        .knowledge_base
        .search(&text, request.offset(), request.limit())
        .await?;
    let encoded = urlencoding::encode(&text);
    let envelope = paginate(hits.hits, request, hits.total, |page| {
        format!("/api/kb/search?q={encoded}&page={page}")
    })?;
    Ok(Json(envelope))
}

pub async fn list_articles(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Envelope<KnowledgeArticle>>, ApiError> {
    let request = PageRequest::parse(params.page.as_deref(), state.articles_per_page)?;
    let page = state
        .knowledge_base
        .list(request.offset(), request.limit())
        .await?;
    let envelope = paginate(page.items, request, page.total, |page| {
        format!("/api/kb/?page={page}")
    })?;
    Ok(Json(envelope))
}
