//! Helpdesk backend library crate.
//!
//! Exposes the ticket tracker and knowledge-base API, the store and auth
//! layers, and configuration for use by the `helpdesk` binary and tests.

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod database;
pub mod errors;
pub mod middleware;
pub mod services;
pub mod utils;
