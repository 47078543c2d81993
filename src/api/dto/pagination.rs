//! Pagination query parameters and response metadata.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

/// Pagination query parameters.
///
/// Uses `serde_with` to parse page numbers from query strings as integers.
#[serde_as]
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub page: Option<u32>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub limit: Option<u32>,
}

impl PaginationParams {
    /// The requested page, defaulting to the first.
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1)
    }

    /// The requested page size, defaulting to 20.
    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(20)
    }

    /// Validates pagination parameters and converts to database offset/limit.
    ///
    /// # Validation
    ///
    /// - Page must be > 0
    /// - Limit must be between 1 and 100
    ///
    /// # Returns
    ///
    /// `(offset, limit)` tuple for SQL queries.
    pub fn validate_and_get_offset_limit(&self) -> Result<(i64, i64), String> {
        let page = self.page();
        let limit = self.limit();

        if page == 0 {
            return Err("Page must be greater than 0".to_string());
        }

        if !(1..=100).contains(&limit) {
            return Err("Limit must be between 1 and 100".to_string());
        }

        let offset = ((page - 1) * limit) as i64;

        Ok((offset, limit as i64))
    }
}

/// Pagination metadata returned alongside a page of results.
#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: i64,
}

impl PaginationMeta {
    pub fn new(page: u32, limit: u32, total: i64) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            (total + limit as i64 - 1) / limit as i64
        };

        Self {
            page,
            limit,
            total,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<u32>, limit: Option<u32>) -> PaginationParams {
        PaginationParams { page, limit }
    }

    #[test]
    fn test_defaults() {
        let (offset, limit) = params(None, None).validate_and_get_offset_limit().unwrap();
        assert_eq!(offset, 0);
        assert_eq!(limit, 20);
    }

    #[test]
    fn test_page_2_with_default_limit() {
        let (offset, limit) = params(Some(2), None)
            .validate_and_get_offset_limit()
            .unwrap();
        assert_eq!(offset, 20);
        assert_eq!(limit, 20);
    }

    #[test]
    fn test_custom_page_and_limit() {
        let (offset, limit) = params(Some(3), Some(50))
            .validate_and_get_offset_limit()
            .unwrap();
        assert_eq!(offset, 100);
        assert_eq!(limit, 50);
    }

    #[test]
    fn test_page_zero_is_error() {
        assert!(params(Some(0), None).validate_and_get_offset_limit().is_err());
    }

    #[test]
    fn test_limit_bounds() {
        assert!(params(None, Some(0)).validate_and_get_offset_limit().is_err());
        assert!(params(None, Some(101))
            .validate_and_get_offset_limit()
            .is_err());
        assert!(params(None, Some(1)).validate_and_get_offset_limit().is_ok());
        assert!(params(None, Some(100))
            .validate_and_get_offset_limit()
            .is_ok());
    }

    #[test]
    fn test_meta_total_pages_rounds_up() {
        let meta = PaginationMeta::new(1, 20, 41);
        assert_eq!(meta.total_pages, 3);
    }

    #[test]
    fn test_meta_empty_result() {
        let meta = PaginationMeta::new(1, 20, 0);
        assert_eq!(meta.total_pages, 0);
    }

    #[test]
    fn test_meta_exact_division() {
        let meta = PaginationMeta::new(2, 10, 40);
        assert_eq!(meta.total_pages, 4);
    }

    #[test]
    fn test_query_string_parsing() {
        let p: PaginationParams = serde_json::from_str(r#"{"page": "3", "limit": "25"}"#).unwrap();
        assert_eq!(p.page(), 3);
        assert_eq!(p.limit(), 25);
    }
}
