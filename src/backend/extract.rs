//! Request Extractors
//!
//! `axum::Json` and `axum::extract::Query` wrappers whose rejections are
//! reported through `ApiError`, so a malformed body or query string gets the
//! usual error envelope with code `INVALID_REQUEST` instead of axum's plain
//! text response.
//!
//! Request schemas keep their business fields optional; handlers check them
//! with [`required`] so a missing field reports the operation's own code
//! (`MISSING_ITEMS`, `MISSING_CATEGORY`, ...) rather than a generic rejection.

use axum::extract::{FromRequest, FromRequestParts};

use crate::backend::error::{ApiError, ApiResult};

/// Largest page any listing returns
pub const MAX_PAGE_SIZE: usize = 100;

/// JSON request body
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct Payload<T>(pub T);

/// Query string parameters
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct Params<T>(pub T);

/// Unwrap a required text field, treating blank strings as missing
pub fn required(value: Option<String>, code: &'static str, message: &str) -> ApiResult<String> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ApiError::validation(code, message)),
    }
}

/// 1-based page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub page: usize,
    pub limit: usize,
}

impl Paging {
    /// Apply defaults and clamp `limit` to `1..=MAX_PAGE_SIZE`
    pub fn new(page: Option<usize>, limit: Option<usize>, default_limit: usize) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(default_limit).clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Rows to skip; saturates so an out-of-range page is simply empty
    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Number of pages needed for `total` results
    pub fn pages(&self, total: usize) -> usize {
        total.div_ceil(self.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paging_defaults_and_clamps() {
        let paging = Paging::new(None, None, 20);
        assert_eq!((paging.page, paging.limit, paging.offset()), (1, 20, 0));

        let paging = Paging::new(Some(3), Some(500), 20);
        assert_eq!(paging.limit, MAX_PAGE_SIZE);
        assert_eq!(paging.offset(), 200);

        let paging = Paging::new(Some(0), Some(0), 20);
        assert_eq!((paging.page, paging.limit), (1, 1));
    }

    #[test]
    fn test_offset_saturates_on_huge_page() {
        let paging = Paging::new(Some(usize::MAX), Some(50), 20);
        assert_eq!(paging.offset(), usize::MAX);
    }

    #[test]
    fn test_pages() {
        let paging = Paging::new(None, Some(20), 20);
        assert_eq!(paging.pages(0), 0);
        assert_eq!(paging.pages(20), 1);
        assert_eq!(paging.pages(21), 2);
    }

    #[test]
    fn test_required_rejects_blank() {
        assert_eq!(required(Some("bike".into()), "X", "x").unwrap(), "bike");
        assert_eq!(required(Some("  ".into()), "MISSING_CATEGORY", "Category is required").unwrap_err().code(), "MISSING_CATEGORY");
        assert!(required(None, "X", "x").is_err());
    }
}
