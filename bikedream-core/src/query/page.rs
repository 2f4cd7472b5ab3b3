//! Pagination.

use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::query::filter::QueryParams;

/// Default page size when the client sends none.
pub const DEFAULT_LIMIT: usize = 25;
/// Hard cap on page size. Limits above the cap are clamped, not rejected.
pub const MAX_LIMIT: usize = 3000;

#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: usize,
    pub limit: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, limit: DEFAULT_LIMIT }
    }
}

impl PageRequest {
    pub fn from_query(params: &QueryParams) -> ApiResult<Self> {
        let page = match params.get("page") {
            None => 1,
            Some(raw) => {
                let page: i64 = raw
                    .trim()
                    .parse()
                    .map_err(|_| ApiError::invalid("page", format!("`{raw}` is not an integer")))?;
                if page <= 0 {
                    return Err(ApiError::invalid("page", "must be at least 1"));
                }
                page as usize
            }
        };
        let limit = match params.get("limit") {
            None => DEFAULT_LIMIT,
            Some(raw) => {
                let limit: i64 = raw
                    .trim()
                    .parse()
                    .map_err(|_| ApiError::invalid("limit", format!("`{raw}` is not an integer")))?;
                if limit <= 0 {
                    return Err(ApiError::invalid("limit", "must be at least 1"));
                }
                (limit as usize).min(MAX_LIMIT)
            }
        };
        Ok(Self { page, limit })
    }
}

/// Pagination envelope returned alongside every page.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PageInfo {
    pub page: usize,
    pub total_pages: usize,
    pub total_count: usize,
    pub limit: usize,
}

/// Slice one page out of a fully sorted result set. Out-of-range pages
/// yield an empty slice, never an error.
pub fn paginate<T>(items: Vec<T>, request: &PageRequest) -> (Vec<T>, PageInfo) {
    let total_count = items.len();
    let total_pages = total_count.div_ceil(request.limit);
    let start = (request.page - 1).saturating_mul(request.limit);

    let page_items: Vec<T> =
        items.into_iter().skip(start).take(request.limit).collect();

    (
        page_items,
        PageInfo { page: request.page, total_pages, total_count, limit: request.limit },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn params(pairs: &[(&str, &str)]) -> QueryParams {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_defaults() {
        let req = PageRequest::from_query(&HashMap::new()).unwrap();
        assert_eq!(req.page, 1);
        assert_eq!(req.limit, DEFAULT_LIMIT);
    }

    #[test]
    fn test_non_positive_rejected() {
        assert!(PageRequest::from_query(&params(&[("page", "0")])).is_err());
        assert!(PageRequest::from_query(&params(&[("page", "-3")])).is_err());
        assert!(PageRequest::from_query(&params(&[("limit", "0")])).is_err());
    }

    #[test]
    fn test_limit_clamps_at_cap() {
        let req = PageRequest::from_query(&params(&[("limit", "999999")])).unwrap();
        assert_eq!(req.limit, MAX_LIMIT);
    }

    #[test]
    fn test_pagination_math() {
        let items: Vec<u32> = (0..55).collect();
        let (page, info) = paginate(items.clone(), &PageRequest { page: 3, limit: 25 });
        assert_eq!(page, (50..55).collect::<Vec<_>>());
        assert_eq!(
            info,
            PageInfo { page: 3, total_pages: 3, total_count: 55, limit: 25 }
        );
    }

    #[test]
    fn test_out_of_range_page_is_empty() {
        let items: Vec<u32> = (0..10).collect();
        let (page, info) = paginate(items, &PageRequest { page: 99, limit: 25 });
        assert!(page.is_empty());
        assert_eq!(info.total_count, 10);
        assert_eq!(info.total_pages, 1);
    }

    #[test]
    fn test_empty_corpus() {
        let (page, info) = paginate(Vec::<u32>::new(), &PageRequest::default());
        assert!(page.is_empty());
        assert_eq!(info.total_pages, 0);
    }
}
