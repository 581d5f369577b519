#![allow(dead_code)]

use std::sync::Arc;

use adapters::MemoryIndex;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::routing::RouterIntoService;
use backend::app::{build_router, AppState};
use backend::auth::AuthService;
use backend::config::AuthConfig;
use backend::database::models::{NewUser, UserId};
use backend::database::{MemoryStore, UserStore};
use tower::ServiceExt;

pub const PER_PAGE: u32 = 10;

pub struct TestApp {
    pub state: AppState,
    pub store: MemoryStore,
    pub index: MemoryIndex,
    pub service: RouterIntoService<Body, ()>,
}

pub fn test_app() -> TestApp {
    let store = MemoryStore::new();
    let index = MemoryIndex::new();
    let auth = AuthService::new(&AuthConfig {
        jwt_secret: "test-secret".to_string(),
        token_ttl_minutes: 60,
    });
    let state = AppState::new(
        Arc::new(store.clone()),
        Arc::new(index.clone()),
        auth,
        PER_PAGE,
    );
    let service = build_router(state.clone()).into_service();
    TestApp {
        state,
        store,
        index,
        service,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response {
        self.service.clone().oneshot(request).await.expect("response")
    }

    /// Creates a user directly in the store and returns a bearer token for it.
    pub async fn user(&self, username: &str) -> (UserId, String) {
        let user = self
            .store
            .create_user(NewUser {
                username: username.to_string(),
                password_hash: "unused".to_string(),
            })
            .await
            .expect("user");
        let token = self.state.auth.issue_token(&user).expect("token").token;
        (user.id, token)
    }
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn authed_json_request(
    method: &str,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .expect("request")
}

/// A JSON-typed request whose body is sent verbatim, valid JSON or not.
pub fn raw_json_request(method: &str, uri: &str, token: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("request")
}

pub async fn read_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

pub async fn expect_json(response: Response, status: StatusCode) -> serde_json::Value {
    assert_eq!(response.status(), status);
    read_json(response).await
}
