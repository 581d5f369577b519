//! In-memory implementation of the store traits.
//!
//! All tables live in one `Tables` value behind a `tokio::sync::RwLock`, so each
//! operation sees a consistent view and ids are assigned under the write lock.
//! Nothing survives a restart; this backend serves local runs without Postgres
//! and the test suite.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::models::{
    ArticlePatch, KnowledgeArticle, NewArticle, NewTicket, NewUser, Ticket, TicketPatch, User,
    UserId, DEFAULT_TICKET_STATUS,
};
use super::{ArticleStore, Page, Store, StoreError, StoreResult, TicketStore, UserStore};

#[derive(Default)]
struct Tables {
    tickets: BTreeMap<i64, Ticket>,
    articles: BTreeMap<i64, KnowledgeArticle>,
    users: BTreeMap<i64, User>,
    next_ticket_id: i64,
    next_article_id: i64,
    next_user_id: i64,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TicketStore for MemoryStore {
    async fn list_tickets(&self) -> StoreResult<Vec<Ticket>> {
        Ok(self.tables.read().await.tickets.values().cloned().collect())
    }

    async fn create_ticket(&self, ticket: NewTicket) -> StoreResult<Ticket> {
        let mut tables = self.tables.write().await;
        let id = next_id(&mut tables.next_ticket_id);
        let now = Utc::now();
        let ticket = Ticket {
            id,
            title: ticket.title,
            description: ticket.description,
            status: DEFAULT_TICKET_STATUS.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.tickets.insert(id, ticket.clone());
        Ok(ticket)
    }

    async fn get_ticket(&self, id: i64) -> StoreResult<Ticket> {
        self.tables
            .read()
            .await
            .tickets
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("ticket".into()))
    }

    async fn update_ticket(&self, id: i64, patch: TicketPatch) -> StoreResult<Ticket> {
        let mut tables = self.tables.write().await;
        let ticket = tables
            .tickets
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound("ticket".into()))?;
        ticket.apply(patch, Utc::now());
        Ok(ticket.clone())
    }
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn create_article(&self, article: NewArticle) -> StoreResult<KnowledgeArticle> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&article.author_id.0) {
            return Err(StoreError::NotFound("author".into()));
        }
        let id = next_id(&mut tables.next_article_id);
        let article = KnowledgeArticle {
            id,
            title: article.title,
            content: article.content,
            category: article.category,
            author_id: article.author_id,
            created_at: Utc::now(),
        };
        tables.articles.insert(id, article.clone());
        Ok(article)
    }

    async fn get_article(&self, id: i64) -> StoreResult<KnowledgeArticle> {
        self.tables
            .read()
            .await
            .articles
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("article".into()))
    }

    async fn update_article(&self, id: i64, patch: ArticlePatch) -> StoreResult<KnowledgeArticle> {
        let mut tables = self.tables.write().await;
        let article = tables
            .articles
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound("article".into()))?;
        article.apply(patch);
        Ok(article.clone())
    }

    async fn delete_article(&self, id: i64) -> StoreResult<()> {
        match self.tables.write().await.articles.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound("article".into())),
        }
    }

    async fn list_articles(&self, offset: u64, limit: u64) -> StoreResult<Page<KnowledgeArticle>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<&KnowledgeArticle> = tables.articles.values().collect();
        rows.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        let total = rows.len() as u64;
        let items = rows
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect();
        Ok(Page { items, total })
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict("username taken".into()));
        }
        let id = next_id(&mut tables.next_user_id);
        let user = User {
            id: UserId(id),
            username: user.username,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        tables.users.insert(id, user.clone());
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn get_user(&self, id: UserId) -> StoreResult<User> {
        self.tables
            .read()
            .await
            .users
            .get(&id.0)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("user".into()))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_ticket(title: &str) -> NewTicket {
        NewTicket {
            title: title.to_string(),
            description: "details".to_string(),
        }
    }

    async fn author(store: &MemoryStore, name: &str) -> UserId {
        store
            .create_user(NewUser {
                username: name.to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .expect("user")
            .id
    }

    fn new_article(author_id: UserId, title: &str) -> NewArticle {
        NewArticle {
            title: title.to_string(),
            content: "body".to_string(),
            category: "general".to_string(),
            author_id,
        }
    }

    #[tokio::test]
    async fn ticket_ids_are_sequential_and_listed_in_order() {
        let store = MemoryStore::new();
        let a = store.create_ticket(new_ticket("a")).await.unwrap();
        let b = store.create_ticket(new_ticket("b")).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));
        assert_eq!(a.status, "Open");
        assert_eq!(a.created_at, a.updated_at);

        let ids: Vec<i64> = store.list_tickets().await.unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn update_missing_ticket_is_not_found() {
        let store = MemoryStore::new();
        let err = store.update_ticket(42, TicketPatch::default()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert!(matches!(store.get_ticket(42).await, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let store = MemoryStore::new();
        author(&store, "ada").await;
        let err = store
            .create_user(NewUser {
                username: "ada".to_string(),
                password_hash: "other".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        let found = store.find_user_by_username("ada").await.unwrap();
        assert_eq!(found.unwrap().password_hash, "hash");
    }

    #[tokio::test]
    async fn articles_list_newest_first_with_total() {
        let store = MemoryStore::new();
        let ada = author(&store, "ada").await;
        for n in 0..5 {
            store.create_article(new_article(ada, &format!("a{n}"))).await.unwrap();
        }
        let page = store.list_articles(0, 2).await.unwrap();
        assert_eq!(page.total, 5);
        let ids: Vec<i64> = page.items.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![5, 4]);

        let tail = store.list_articles(4, 2).await.unwrap();
        assert_eq!(tail.items.len(), 1);
        assert_eq!(tail.items[0].id, 1);
    }

    #[tokio::test]
    async fn article_requires_existing_author_and_deletes_once() {
        let store = MemoryStore::new();
        let err = store.create_article(new_article(UserId(7), "x")).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));

        let ada = author(&store, "ada").await;
        let article = store.create_article(new_article(ada, "x")).await.unwrap();
        store.delete_article(article.id).await.unwrap();
        assert!(matches!(
            store.delete_article(article.id).await,
            Err(StoreError::NotFound(_))
        ));
    }
}
