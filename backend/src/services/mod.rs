//! Module for core business logic services.
//!
//! This module encapsulates services that orchestrate more than one backing
//! system per request, such as keeping the knowledge-base store and its search
//! index in step.

pub mod knowledge_base;

pub use knowledge_base::{KbError, KnowledgeBase};
