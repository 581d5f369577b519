//! Module for the knowledge-base article API.
//!
//! Reads are public; creating, updating and deleting require a bearer token,
//! and only an article's author may update or delete it.

pub mod handlers;
pub mod routes;
