//! Request handlers for the support-ticket tracker.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::api::{optional_text, required_text};
use crate::app::AppState;
use crate::database::models::{
    NewTicket, Ticket, TicketPatch, TICKET_STATUS_MAX, TICKET_TITLE_MAX,
};
use crate::database::StoreError;
use crate::errors::{api_internal, api_not_found, ApiError};

#[derive(Debug, Deserialize)]
pub struct CreateTicketRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTicketRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

pub async fn list_tickets(State(state): State<AppState>) -> Result<Json<Vec<Ticket>>, ApiError> {
    let tickets = state
        .store
        .list_tickets()
        .await
        .map_err(|err| api_internal("failed to list tickets", &err))?;
    Ok(Json(tickets))
}

pub async fn create_ticket(
    State(state): State<AppState>,
    payload: Result<Json<CreateTicketRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = payload?;
    let ticket = NewTicket {
        title: required_text("title", body.title, Some(TICKET_TITLE_MAX))?,
        description: required_text("description", body.description, None)?,
    };
    let created = state
        .store
        .create_ticket(ticket)
        .await
        .map_err(|err| api_internal("failed to create ticket", &err))?;
    tracing::info!(ticket_id = created.id, "ticket created");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_ticket(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<Ticket>, ApiError> {
    match state.store.get_ticket(id).await {
        Ok(ticket) => Ok(Json(ticket)),
        Err(StoreError::NotFound(_)) => Err(api_not_found("ticket not found")),
        Err(err) => Err(api_internal("failed to fetch ticket", &err)),
    }
}

pub async fn update_ticket(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    payload: Result<Json<UpdateTicketRequest>, JsonRejection>,
) -> Result<Json<Ticket>, ApiError> {
    // An unknown id is a 404 whatever the body holds.
    match state.store.get_ticket(id).await {
        Ok(_) => {}
        Err(StoreError::NotFound(_)) => return Err(api_not_found("ticket not found")),
        Err(err) => return Err(api_internal("failed to fetch ticket", &err)),
    }
    let Json(body) = payload?;
    let patch = TicketPatch {
        title: optional_text("title", body.title, Some(TICKET_TITLE_MAX))?,
        description: optional_text("description", body.description, None)?,
        status: optional_text("status", body.status, Some(TICKET_STATUS_MAX))?,
    };
    match state.store.update_ticket(id, patch).await {
        Ok(ticket) => {
            tracing::info!(ticket_id = id, status = %ticket.status, "ticket updated");
            Ok(Json(ticket))
        }
        Err(StoreError::NotFound(_)) => Err(api_not_found("ticket not found")),
        Err(err) => Err(api_internal("failed to update ticket", &err)),
    }
}
