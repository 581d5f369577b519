//! Central module for organizing the application's main API endpoints.
//!
//! This module acts as a top-level container for the ticket tracker and the
//! knowledge base, excluding authentication routes which are handled separately,
//! plus the request-body checks their handlers share.

pub mod article;
pub mod pagination;
pub mod system;
pub mod ticket;

use crate::database::models::check_text;
use crate::errors::{api_validation_error, ApiError};

/// A field the request body must carry, non-blank and within `max` characters.
pub(crate) fn required_text(
    field: &str,
    value: Option<String>,
    max: Option<usize>,
) -> Result<String, ApiError> {
    let value = value.ok_or_else(|| api_validation_error(format!("{field} is required")))?;
    check_text(field, &value, max).map_err(api_validation_error)?;
    Ok(value)
}

/// A field the request body may carry; checked only when present.
pub(crate) fn optional_text(
    field: &str,
    value: Option<String>,
    max: Option<usize>,
) -> Result<Option<String>, ApiError> {
    match value {
        Some(value) => required_text(field, Some(value), max).map(Some),
        None => Ok(None),
    }
}
