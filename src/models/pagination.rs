//! Page resolution for listing views

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::{AppError, AppResult};

/// `?page=` query parameter: a 1-based number or `last`
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct PageQuery {
    pub page: Option<String>,
}

/// Pagination block returned next to every list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PageInfo {
    pub number: i64,
    pub num_pages: i64,
    pub count: i64,
    pub per_page: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl PageInfo {
    /// More than one page exists
    pub fn is_paginated(&self) -> bool {
        self.num_pages > 1
    }
}

/// A resolved page: where to read and what to report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    pub limit: i64,
    pub offset: i64,
    pub info: PageInfo,
}

/// Resolve a requested page against a row count.
///
/// The first page always exists, even for an empty table. Anything else that
/// is not a page number within range is reported as not found.
pub fn resolve_page(requested: Option<&str>, count: i64, per_page: i64) -> AppResult<PageWindow> {
    let per_page = per_page.max(1);
    let num_pages = if count <= 0 {
        1
    } else {
        (count + per_page - 1) / per_page
    };

    let number = match requested.map(str::trim) {
        None | Some("") => 1,
        Some("last") => num_pages,
        Some(raw) => raw
            .parse::<i64>()
            .map_err(|_| AppError::NotFound("That page number is not an integer".to_string()))?,
    };

    if number < 1 || number > num_pages {
        return Err(AppError::NotFound("That page contains no results".to_string()));
    }

    Ok(PageWindow {
        limit: per_page,
        offset: (number - 1) * per_page,
        info: PageInfo {
            number,
            num_pages,
            count,
            per_page,
            has_next: number < num_pages,
            has_previous: number > 1,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_page_by_default() {
        let window = resolve_page(None, 25, 10).unwrap();
        assert_eq!(window.offset, 0);
        assert_eq!(window.limit, 10);
        assert_eq!(window.info.num_pages, 3);
        assert!(window.info.has_next);
        assert!(!window.info.has_previous);
        assert!(window.info.is_paginated());
    }

    #[test]
    fn test_last_page() {
        let window = resolve_page(Some("last"), 25, 10).unwrap();
        assert_eq!(window.info.number, 3);
        assert_eq!(window.offset, 20);
        assert!(!window.info.has_next);
    }

    #[test]
    fn test_empty_table_has_one_page() {
        let window = resolve_page(Some("1"), 0, 10).unwrap();
        assert_eq!(window.info.num_pages, 1);
        assert!(!window.info.is_paginated());
    }

    #[test]
    fn test_exact_multiple() {
        let window = resolve_page(Some("2"), 20, 10).unwrap();
        assert_eq!(window.info.num_pages, 2);
        assert_eq!(window.offset, 10);
    }

    #[test]
    fn test_out_of_range_and_garbage() {
        assert!(matches!(resolve_page(Some("4"), 25, 10), Err(AppError::NotFound(_))));
        assert!(matches!(resolve_page(Some("0"), 25, 10), Err(AppError::NotFound(_))));
        assert!(matches!(resolve_page(Some("two"), 25, 10), Err(AppError::NotFound(_))));
        assert!(matches!(resolve_page(Some("2"), 0, 10), Err(AppError::NotFound(_))));
    }
}
