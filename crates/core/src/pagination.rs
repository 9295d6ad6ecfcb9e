//! Page-based pagination shared by every listing query.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// Validated page request (1-based page number).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Build a page request, applying defaults for missing values.
    ///
    /// `page` must be at least 1 and `limit` must fall within `1..=100`.
    pub fn new(page: Option<i64>, limit: Option<i64>) -> DomainResult<Self> {
        let page = page.unwrap_or(i64::from(DEFAULT_PAGE));
        let limit = limit.unwrap_or(i64::from(DEFAULT_LIMIT));

        if page < 1 {
            return Err(DomainError::validation("page", "page must be greater than 0"));
        }
        let page = u32::try_from(page)
            .map_err(|_| DomainError::validation("page", format!("page cannot exceed {}", u32::MAX)))?;
        if limit < 1 {
            return Err(DomainError::validation("limit", "limit must be greater than 0"));
        }
        if limit > i64::from(MAX_LIMIT) {
            return Err(DomainError::validation(
                "limit",
                format!("limit cannot exceed {MAX_LIMIT}"),
            ));
        }

        Ok(Self {
            page,
            limit: limit as u32,
        })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of records to skip before this page starts.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

/// One page of results plus the totals needed to render pagination controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            data,
            page: request.page(),
            limit: request.limit(),
            total_pages: total_pages(total, request.limit()),
            total,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
            total: self.total,
        }
    }
}

/// `ceil(total / limit)`; zero records means zero pages.
pub fn total_pages(total: u64, limit: u32) -> u64 {
    total.div_ceil(u64::from(limit.max(1)))
}

/// Slice an already ordered, already filtered collection into a page.
pub fn paginate<T>(items: Vec<T>, request: PageRequest) -> Page<T> {
    let total = items.len() as u64;
    let data = items
        .into_iter()
        .skip(request.offset() as usize)
        .take(request.limit() as usize)
        .collect();
    Page::new(data, request, total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_first_page_of_ten() {
        let req = PageRequest::new(None, None).unwrap();
        assert_eq!(req, PageRequest::default());
        assert_eq!((req.page(), req.limit()), (1, 10));
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(25, 10), 3);
        assert_eq!(total_pages(20, 10), 2);
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 100), 1);
    }

    #[test]
    fn rejects_out_of_range_requests() {
        assert_eq!(PageRequest::new(Some(0), None).unwrap_err().field(), Some("page"));
        assert_eq!(PageRequest::new(None, Some(0)).unwrap_err().field(), Some("limit"));
        assert_eq!(PageRequest::new(None, Some(101)).unwrap_err().field(), Some("limit"));
        assert_eq!(PageRequest::new(Some(-2), None).unwrap_err().field(), Some("page"));
        assert!(PageRequest::new(Some(7), Some(100)).is_ok());
    }

    #[test]
    fn paginate_slices_the_requested_window() {
        let items: Vec<u32> = (0..25).collect();
        let page = paginate(items, PageRequest::new(Some(3), Some(10)).unwrap());
        assert_eq!(page.data, vec![20, 21, 22, 23, 24]);
        assert_eq!(page.total, 25);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn page_past_the_end_is_empty_but_keeps_totals() {
        let items: Vec<u32> = (0..5).collect();
        let page = paginate(items, PageRequest::new(Some(4), Some(2)).unwrap());
        assert!(page.data.is_empty());
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn serializes_with_camel_case_totals() {
        let page = Page::new(vec![1], PageRequest::default(), 1);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["totalPages"], 1);
        assert_eq!(json["total"], 1);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: the last page is the first one that covers every record.
            #[test]
            fn total_pages_is_tight_ceiling(total in 0u64..100_000, limit in 1u32..=MAX_LIMIT) {
                let pages = total_pages(total, limit);
                prop_assert!(pages * u64::from(limit) >= total);
                if total > 0 {
                    prop_assert!((pages - 1) * u64::from(limit) < total);
                } else {
                    prop_assert_eq!(pages, 0);
                }
            }
        }
    }
}
