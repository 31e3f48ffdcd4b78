//! # Pagination DTOs

use serde::{Deserialize, Serialize};

/// Pagination metadata attached to every list response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl Pagination {
    /// Build pagination metadata for a 1-based page.
    pub fn new(total: i64, page: i64, limit: i64) -> Self {
        Self {
            total,
            page,
            limit,
            has_next_page: page.saturating_mul(limit) < total,
            has_previous_page: page > 1,
        }
    }
}

/// Query string accepted by paginated list endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_first_page_of_many() {
        let p = Pagination::new(45, 1, 20);
        assert!(p.has_next_page);
        assert!(!p.has_previous_page);
    }

    #[test]
    fn test_pagination_last_page() {
        let p = Pagination::new(45, 3, 20);
        assert!(!p.has_next_page);
        assert!(p.has_previous_page);
    }

    #[test]
    fn test_pagination_exact_fit_has_no_next_page() {
        let p = Pagination::new(40, 2, 20);
        assert!(!p.has_next_page);
    }

    #[test]
    fn test_pagination_huge_page_has_no_next_page() {
        let p = Pagination::new(3, i64::MAX, 100);
        assert!(!p.has_next_page);
        assert!(p.has_previous_page);
    }

    #[test]
    fn test_pagination_serializes_camel_case() {
        let json = serde_json::to_value(Pagination::new(0, 1, 50)).unwrap();
        assert_eq!(json["hasNextPage"], false);
        assert_eq!(json["hasPreviousPage"], false);
        assert_eq!(json["limit"], 50);
    }
}
