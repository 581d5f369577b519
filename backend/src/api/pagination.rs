//! Paginated response envelope shared by the article listing and search.
//!
//! ```json
//! { "items": [...],
//!   "_meta":  { "page": 1, "per_page": 10, "total_pages": 2, "total_items": 15 },
//!   "_links": { "self": "/api/kb/?page=1", "next": "/api/kb/?page=2", "prev": null } }
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{api_not_found, api_validation_error, ApiError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    /// Missing or unparsable `page` means page 1; explicit values below 1 are rejected.
    pub fn parse(raw: Option<&str>, per_page: u32) -> Result<Self, ApiError> {
        let page = raw.and_then(|value| value.trim().parse::<i64>().ok()).unwrap_or(1);
        if page < 1 {
            return Err(api_validation_error("page must be at least 1"));
        }
        Ok(Self {
            page: u32::try_from(page).unwrap_or(u32::MAX),
            per_page,
        })
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.per_page)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.per_page)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageMeta {
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u64,
    pub total_items: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageLinks {
    #[serde(rename = "self")]
    pub self_link: String,
    pub next: Option<String>,
    pub prev: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub items: Vec<T>,
    #[serde(rename = "_meta")]
    pub meta: PageMeta,
    #[serde(rename = "_links")]
    pub links: PageLinks,
}

pub fn total_pages(total_items: u64, per_page: u32) -> u64 {
    total_items.div_ceil(u64::from(per_page.max(1)))
}

/// Wraps one page of `items` out of `total_items`.
///
/// `link` renders the URL of a given page number. A page past the last one
/// is a 404, except page 1 which is always valid (empty result).
pub fn paginate<T>(
    items: Vec<T>,
    request: PageRequest,
    total_items: u64,
    link: impl Fn(u32) -> String,
) -> Result<Envelope<T>, ApiError> {
    let pages = total_pages(total_items, request.per_page);
    let page = request.page;
    if page > 1 && u64::from(page) > pages {
        return Err(api_not_found(format!("page {page} does not exist")));
    }
    Ok(Envelope {
        items,
        meta: PageMeta {
            page,
            per_page: request.per_page,
            total_pages: pages,
            total_items,
        },
        links: PageLinks {
            self_link: link(page),
            next: (u64::from(page) < pages).then(|| link(page + 1)),
            prev: (page > 1).then(|| link(page - 1)),
        },
    })
}
