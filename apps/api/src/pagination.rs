use serde::{Deserialize, Serialize};

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_size: i64,
    pub max_size: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// A validated, 1-indexed page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    pub fn resolve(
        page: Option<i64>,
        limit: Option<i64>,
        limits: PageLimits,
    ) -> Result<Self, AppError> {
        let page = page.unwrap_or(1);
        if page < 1 {
            return Err(AppError::Validation("page must be at least 1".to_string()));
        }
        let limit = limit.unwrap_or(limits.default_size);
        if limit < 1 {
            return Err(AppError::Validation("limit must be at least 1".to_string()));
        }
        let limit = limit.min(limits.max_size);
        if (page - 1).checked_mul(limit).is_none() {
            return Err(AppError::Validation("page is out of range".to_string()));
        }
        Ok(Self { page, limit })
    }

    pub fn from_params(params: &PageParams, limits: PageLimits) -> Result<Self, AppError> {
        Self::resolve(params.page, params.limit, limits)
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }

    pub fn total_pages(&self, total: i64) -> i64 {
        (total + self.limit - 1) / self.limit
    }

    pub fn describe(&self, total: i64) -> Pagination {
        Pagination {
            current_page: self.page,
            page_size: self.limit,
            total_pages: self.total_pages(total),
            total,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: i64,
    pub page_size: i64,
    pub total_pages: i64,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMITS: PageLimits = PageLimits {
        default_size: 10,
        max_size: 100,
    };

    #[test]
    fn test_defaults() {
        let page = PageRequest::resolve(None, None, LIMITS).unwrap();
        assert_eq!(page, PageRequest { page: 1, limit: 10 });
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn test_limit_is_clamped_and_zero_rejected() {
        assert_eq!(
            PageRequest::resolve(Some(3), Some(500), LIMITS).unwrap().limit,
            100
        );
        assert!(PageRequest::resolve(Some(0), None, LIMITS).is_err());
        assert!(PageRequest::resolve(None, Some(0), LIMITS).is_err());
    }

    #[test]
    fn test_page_whose_offset_overflows_is_rejected() {
        assert!(matches!(
            PageRequest::resolve(Some(i64::MAX), None, LIMITS),
            Err(AppError::Validation(_))
        ));
        let last = i64::MAX / 10 + 1;
        let page = PageRequest::resolve(Some(last), Some(10), LIMITS).unwrap();
        assert_eq!(page.offset(), (last - 1) * 10);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let page = PageRequest { page: 2, limit: 10 };
        assert_eq!(page.offset(), 10);
        assert_eq!(page.total_pages(0), 0);
        assert_eq!(page.total_pages(10), 1);
        assert_eq!(page.total_pages(11), 2);
    }
}
