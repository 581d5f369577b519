//! Module for custom Axum middleware.
//!
//! Currently the request tracing layer: one `http.request` span per request
//! carrying method and URI, with the response status logged at `info`. The
//! `user_id` and `username` fields are filled in by `AuthUser` on protected routes.

use axum::body::Body;
use axum::http::Request;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::{Level, Span};

pub fn trace_layer(
) -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>, impl Fn(&Request<Body>) -> Span + Clone> {
    TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http.request",
                method = %request.method(),
                uri = %request.uri(),
                user_id = tracing::field::Empty,
                username = tracing::field::Empty,
            )
        })
        .on_response(DefaultOnResponse::new().level(Level::INFO))
}
