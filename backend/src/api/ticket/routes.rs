//! Defines the HTTP routes of the support-ticket tracker.

use axum::routing::get;
use axum::Router;

use super::handlers::{create_ticket, get_ticket, list_tickets, update_ticket};
use crate::app::AppState;

pub fn ticket_router() -> Router<AppState> {
    Router::new()
        .route("/api/tickets", get(list_tickets).post(create_ticket))
        .route("/api/tickets/:id", get(get_ticket).put(update_ticket))
}
