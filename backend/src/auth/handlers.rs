//! HTTP request handlers for authentication endpoints.
//!
//! Registration stores an argon2 hash of the password; login checks it and
//! returns a bearer token; `me` echoes the caller resolved from that token.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use super::errors::AuthError;
use super::middleware::AuthUser;
use super::models::{
    LoginRequest, RegisterRequest, TokenResponse, PASSWORD_MIN, USERNAME_MAX, USERNAME_MIN,
};
use super::service::AuthService;
use crate::app::AppState;
use crate::database::models::{NewUser, User};
use crate::database::StoreError;
use crate::errors::{api_conflict, api_internal, api_not_found, api_validation_error, ApiError};

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = payload?;
    let username = body
        .username
        .map(|u| u.trim().to_string())
        .ok_or_else(|| api_validation_error("username is required"))?;
    let password = body
        .password
        .ok_or_else(|| api_validation_error("password is required"))?;

    let length = username.chars().count();
    if !(USERNAME_MIN..=USERNAME_MAX).contains(&length) {
        return Err(api_validation_error(format!(
            "username must be {USERNAME_MIN} to {USERNAME_MAX} characters"
        )));
    }
    if password.chars().count() < PASSWORD_MIN {
        return Err(api_validation_error(format!(
            "password must be at least {PASSWORD_MIN} characters"
        )));
    }

    let password_hash = AuthService::hash_password(password).await?;
    match state
        .store
        .create_user(NewUser {
            username,
            password_hash,
        })
        .await
    {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "user registered");
            Ok((StatusCode::CREATED, Json(user)))
        }
        Err(StoreError::Conflict(_)) => Err(api_conflict("username already taken")),
        Err(err) => Err(api_internal("failed to register user", &err)),
    }
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(body) = payload?;
    let (Some(username), Some(password)) = (body.username, body.password) else {
        return Err(api_validation_error("username and password are required"));
    };

    let user = state
        .store
        .find_user_by_username(username.trim())
        .await
        .map_err(|err| api_internal("failed to load user", &err))?
        .ok_or(AuthError::InvalidCredentials)?;

    if !AuthService::verify_password(password, user.password_hash.clone()).await? {
        tracing::info!(user_id = %user.id, "login rejected");
        return Err(AuthError::InvalidCredentials.into());
    }

    let issued = state.auth.issue_token(&user)?;
    Ok(Json(TokenResponse {
        access_token: issued.token,
        token_type: "Bearer".to_string(),
        expires_in: issued.expires_in,
    }))
}

pub async fn me(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<User>, ApiError> {
    match state.store.get_user(caller.user_id).await {
        Ok(user) => Ok(Json(user)),
        Err(StoreError::NotFound(_)) => Err(api_not_found("user not found")),
        Err(err) => Err(api_internal("failed to load user", &err)),
    }
}
