//! Axum extractor guarding protected routes.
//!
//! Handlers that take an `AuthUser` argument only run for requests carrying a
//! valid `Authorization: Bearer <token>` header; everything else is rejected
//! with 401 before the handler body executes.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use super::errors::AuthError;
use crate::app::AppState;
use crate::database::models::UserId;
use crate::errors::ApiError;

/// Verified caller identity.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: UserId,
    pub username: String,
}

impl AuthUser {
    /// Tags the enclosing `http.request` span with the caller.
    fn record_on_span(&self) {
        let span = tracing::Span::current();
        span.record("user_id", self.user_id.0);
        span.record("username", self.username.as_str());
    }
}

pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers).ok_or(AuthError::MissingToken)?;
        let identity = state.auth.verify_token(token).map_err(|err| {
            tracing::debug!(error = %err, "rejected bearer token");
            err
        })?;
        let user = AuthUser {
            user_id: identity.user_id,
            username: identity.username,
        };
        user.record_on_span();
        Ok(user)
    }
}
