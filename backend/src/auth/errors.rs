//! Error types specific to authentication and authorization processes.

use thiserror::Error;

use crate::errors::{api_internal, api_unauthorized, ApiError};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,
    #[error("invalid token: {0}")]
    InvalidToken(String),
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("cannot issue token: {0}")]
    TokenEncoding(#[from] jsonwebtoken::errors::Error),
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken => api_unauthorized("authentication required"),
            AuthError::InvalidToken(_) => api_unauthorized("invalid or expired token"),
            AuthError::InvalidCredentials => api_unauthorized("invalid username or password"),
            AuthError::TokenEncoding(_) | AuthError::Hashing(_) => {
                api_internal("authentication failure", &err)
            }
        }
    }
}
