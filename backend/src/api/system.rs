//! Liveness endpoint reporting which store and index backends are wired in.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::app::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub store: &'static str,
    pub search: &'static str,
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let store_ok = match state.store.health_check().await {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(error = %err, "store health check failed");
            false
        }
    };
    let search_ok = match state.search.health_check().await {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(error = %err, "search health check failed");
            false
        }
    };
    let status = if store_ok && search_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let body = HealthResponse {
        status: if status == StatusCode::OK { "ok" } else { "degraded" },
        store: state.store.backend_name(),
        search: state.search.backend_name(),
    };
    (status, Json(body))
}
