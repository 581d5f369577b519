//! Knowledge-base article operations spanning the store and the search index.
//!
//! Every mutation is a two-step write: the store commit happens first and is
//! authoritative, then the article is mirrored into (or removed from) the
//! search index. The two systems are not transactionally linked. If the second
//! step fails, the caller still gets the committed result and the divergence is
//! logged at `error` level with the article id and the mirror operation, so it
//! can be found and repaired by re-saving the article.

use std::sync::Arc;

use adapters::{SearchError, SearchHits, SearchIndex, SearchQuery};
use thiserror::Error;

use crate::database::models::{ArticlePatch, KnowledgeArticle, NewArticle, UserId};
use crate::database::{Page, Store, StoreError};
use crate::errors::{
    api_forbidden, api_internal, api_not_found, api_unauthorized, api_validation_error, ApiError,
};

#[derive(Debug, Error)]
pub enum KbError {
    #[error("article not found")]
    NotFound,
    #[error("only the author may modify this article")]
    Forbidden,
    #[error("caller no longer exists")]
    UnknownAuthor,
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Search(#[from] SearchError),
}

impl From<KbError> for ApiError {
    fn from(err: KbError) -> Self {
        match err {
            KbError::NotFound => api_not_found("article not found"),
            KbError::Forbidden => api_forbidden("only the author may modify this article"),
            KbError::UnknownAuthor => api_unauthorized("caller no longer exists"),
            KbError::Validation(message) => api_validation_error(message),
            KbError::Store(err) => api_internal("knowledge base storage failure", &err),
            KbError::Search(err) if err.is_result_window() => {
                api_validation_error(err.to_string())
            }
            KbError::Search(err) => api_internal("knowledge base search failure", &err),
        }
    }
}

fn article_lookup(err: StoreError) -> KbError {
    match err {
        StoreError::NotFound(_) => KbError::NotFound,
        other => KbError::Store(other),
    }
}

#[derive(Clone)]
pub struct KnowledgeBase {
    store: Arc<dyn Store>,
    index: Arc<dyn SearchIndex>,
}

impl KnowledgeBase {
    pub fn new(store: Arc<dyn Store>, index: Arc<dyn SearchIndex>) -> Self {
        Self { store, index }
    }

    pub async fn create(&self, article: NewArticle) -> Result<KnowledgeArticle, KbError> {
        let article = self
            .store
            .create_article(article)
            .await
            .map_err(|err| match err {
                StoreError::NotFound(_) => KbError::UnknownAuthor,
                other => KbError::Store(other),
            })?;
        tracing::info!(article_id = article.id, author_id = %article.author_id, "article created");
        self.mirror(&article).await;
        Ok(article)
    }

    pub async fn get(&self, id: i64) -> Result<KnowledgeArticle, KbError> {
        self.store.get_article(id).await.map_err(article_lookup)
    }

    /// Loads the article and checks that `caller` wrote it.
    async fn owned_by(&self, caller: UserId, id: i64) -> Result<KnowledgeArticle, KbError> {
        let article = self.get(id).await?;
        if !article.is_authored_by(caller) {
            tracing::info!(article_id = id, caller = %caller, "non-author mutation rejected");
            return Err(KbError::Forbidden);
        }
        Ok(article)
    }

    /// `patch` is the decoded request body. A body that failed to decode is
    /// reported only after the caller is known to own the article.
    pub async fn update(
        &self,
        caller: UserId,
        id: i64,
        patch: Result<ArticlePatch, KbError>,
    ) -> Result<KnowledgeArticle, KbError> {
        self.owned_by(caller, id).await?;
        let patch = patch?;
        patch.validate().map_err(KbError::Validation)?;
        let article = self
            .store
            .update_article(id, patch)
            .await
            .map_err(article_lookup)?;
        tracing::info!(article_id = id, "article updated");
        self.mirror(&article).await;
        Ok(article)
    }

    pub async fn delete(&self, caller: UserId, id: i64) -> Result<(), KbError> {
        self.owned_by(caller, id).await?;
        self.store.delete_article(id).await.map_err(article_lookup)?;
        tracing::info!(article_id = id, "article deleted");
        self.unmirror(id).await;
        Ok(())
    }

    /// Ranked index hits, never store rows.
    pub async fn search(&self, text: &str, from: u64, size: u64) -> Result<SearchHits, KbError> {
        let query = SearchQuery {
            text: text.to_string(),
            from: from as usize,
            size: size as usize,
        };
        Ok(self.index.search_articles(&query).await?)
    }

    pub async fn list(&self, offset: u64, limit: u64) -> Result<Page<KnowledgeArticle>, KbError> {
        Ok(self.store.list_articles(offset, limit).await?)
    }

    async fn mirror(&self, article: &KnowledgeArticle) {
        match self.index.index_article(&article.to_document()).await {
            Ok(outcome) => {
                tracing::debug!(article_id = article.id, result = outcome.as_str(), "article mirrored");
            }
            Err(err) => {
                tracing::error!(
                    article_id = article.id,
                    op = "index",
                    error = %err,
                    "search index out of sync with store"
                );
            }
        }
    }

    async fn unmirror(&self, id: i64) {
        match self.index.delete_article(id).await {
            Ok(()) => tracing::debug!(article_id = id, "article removed from index"),
            Err(err) if err.is_not_found() => {
                tracing::warn!(article_id = id, "deleted article was missing from index");
            }
            Err(err) => {
                tracing::error!(
                    article_id = id,
                    op = "delete",
                    error = %err,
                    "search index out of sync with store"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::NewUser;
    use crate::database::{MemoryStore, UserStore};
    use adapters::{ArticleDocument, IndexOutcome, MemoryIndex, SearchResult};
    use async_trait::async_trait;

    /// Index that accepts nothing, standing in for an unreachable engine.
    struct DownIndex;

    #[async_trait]
    impl SearchIndex for DownIndex {
        async fn ensure_index(&self) -> SearchResult<()> {
            Ok(())
        }
        async fn index_article(&self, _doc: &ArticleDocument) -> SearchResult<IndexOutcome> {
            Err(SearchError::Status {
                status: 503,
                body: "unavailable".to_string(),
            })
        }
        async fn search_articles(&self, _query: &SearchQuery) -> SearchResult<SearchHits> {
            Err(SearchError::Status {
                status: 503,
                body: "unavailable".to_string(),
            })
        }
        async fn delete_article(&self, _id: i64) -> SearchResult<()> {
            Err(SearchError::Status {
                status: 503,
                body: "unavailable".to_string(),
            })
        }
        async fn health_check(&self) -> SearchResult<()> {
            Ok(())
        }
        fn backend_name(&self) -> &'static str {
            "down"
        }
    }

    async fn setup(index: Arc<dyn SearchIndex>) -> (KnowledgeBase, UserId, UserId) {
        let store = MemoryStore::new();
        let mut ids = Vec::new();
        for name in ["ada", "bob"] {
            let user = store
                .create_user(NewUser {
                    username: name.to_string(),
                    password_hash: "hash".to_string(),
                })
                .await
                .unwrap();
            ids.push(user.id);
        }
        (KnowledgeBase::new(Arc::new(store), index), ids[0], ids[1])
    }

    fn draft(author_id: UserId) -> NewArticle {
        NewArticle {
            title: "Reset a VPN token".to_string(),
            content: "Open the portal and request a new token".to_string(),
            category: "network".to_string(),
            author_id,
        }
    }

    #[tokio::test]
    async fn create_mirrors_into_index() {
        let index = MemoryIndex::new();
        let (kb, ada, _) = setup(Arc::new(index.clone())).await;
        let article = kb.create(draft(ada)).await.unwrap();
        assert!(index.contains(article.id).await);
        let hits = kb.search("vpn", 0, 10).await.unwrap();
        assert_eq!(hits.total, 1);
        assert_eq!(hits.hits[0].id, article.id);
    }

    #[tokio::test]
    async fn only_author_may_update_or_delete() {
        let index = MemoryIndex::new();
        let (kb, ada, bob) = setup(Arc::new(index.clone())).await;
        let article = kb.create(draft(ada)).await.unwrap();

        let patch = ArticlePatch {
            title: Some("Hijacked".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            kb.update(bob, article.id, Ok(patch.clone())).await,
            Err(KbError::Forbidden)
        ));
        assert!(matches!(kb.delete(bob, article.id).await, Err(KbError::Forbidden)));

        let updated = kb.update(ada, article.id, Ok(patch)).await.unwrap();
        assert_eq!(updated.title, "Hijacked");
        assert_eq!(updated.author_id, ada);
        let hits = kb.search("hijacked", 0, 10).await.unwrap();
        assert_eq!(hits.total, 1);

        kb.delete(ada, article.id).await.unwrap();
        assert!(matches!(kb.get(article.id).await, Err(KbError::NotFound)));
        assert!(!index.contains(article.id).await);
    }

    #[tokio::test]
    async fn ownership_is_checked_before_validation() {
        let (kb, ada, bob) = setup(Arc::new(MemoryIndex::new())).await;
        let article = kb.create(draft(ada)).await.unwrap();
        let blank = ArticlePatch {
            title: Some(String::new()),
            ..Default::default()
        };
        assert!(matches!(
            kb.update(bob, article.id, Ok(blank.clone())).await,
            Err(KbError::Forbidden)
        ));
        assert!(matches!(
            kb.update(ada, article.id, Ok(blank)).await,
            Err(KbError::Validation(_))
        ));
        assert!(matches!(
            kb.update(ada, 999, Ok(ArticlePatch::default())).await,
            Err(KbError::NotFound)
        ));
    }

    #[tokio::test]
    async fn undecodable_body_is_reported_after_lookup_and_ownership() {
        let (kb, ada, bob) = setup(Arc::new(MemoryIndex::new())).await;
        let article = kb.create(draft(ada)).await.unwrap();
        let bad_body = || Err(KbError::Validation("title: invalid type".to_string()));

        assert!(matches!(kb.update(ada, 999, bad_body()).await, Err(KbError::NotFound)));
        assert!(matches!(
            kb.update(bob, article.id, bad_body()).await,
            Err(KbError::Forbidden)
        ));
        assert!(matches!(
            kb.update(ada, article.id, bad_body()).await,
            Err(KbError::Validation(_))
        ));
        assert_eq!(kb.get(article.id).await.unwrap(), article);
    }

    #[test]
    fn search_errors_map_to_status() {
        let deep = ApiError::from(KbError::Search(SearchError::ResultWindow {
            from: 10_000,
            max: 10_000,
        }));
        assert_eq!(deep.status, axum::http::StatusCode::BAD_REQUEST);
        assert_eq!(deep.body.code, "validation_error");

        let down = ApiError::from(KbError::Search(SearchError::Status {
            status: 503,
            body: "unavailable".to_string(),
        }));
        assert_eq!(down.status, axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn index_failure_keeps_committed_store_write() {
        let (kb, ada, _) = setup(Arc::new(DownIndex)).await;
        let article = kb.create(draft(ada)).await.expect("store commit wins");
        assert_eq!(kb.get(article.id).await.unwrap(), article);

        kb.delete(ada, article.id).await.expect("delete still succeeds");
        assert!(matches!(kb.get(article.id).await, Err(KbError::NotFound)));

        assert!(matches!(kb.search("vpn", 0, 10).await, Err(KbError::Search(_))));
    }

    #[tokio::test]
    async fn unknown_author_is_rejected() {
        let (kb, _, _) = setup(Arc::new(MemoryIndex::new())).await;
        assert!(matches!(
            kb.create(draft(UserId(99))).await,
            Err(KbError::UnknownAuthor)
        ));
    }
}
