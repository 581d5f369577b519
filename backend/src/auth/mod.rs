//! Authentication: user accounts, bearer tokens, and the `AuthUser` extractor.
//!
//! Article writes are the only routes guarded by a token; tickets stay open.

pub mod routes;
pub mod handlers;
pub mod models;
pub mod middleware;
pub mod service;
pub mod errors;

// Re-exports for convenience
pub use errors::AuthError;
pub use middleware::AuthUser;
pub use routes::auth_router;
pub use service::AuthService;
