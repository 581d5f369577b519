//! Module for the support-ticket tracker API.
//!
//! Tickets can be listed, created, fetched and partially updated. There is no
//! delete operation.

pub mod handlers;
pub mod routes;
