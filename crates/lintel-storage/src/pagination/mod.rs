//! Skip/limit pagination.

use serde::{Deserialize, Serialize};

const DEFAULT_LIMIT: u32 = 50;
const MAX_LIMIT: u32 = 500;

/// Caller-supplied page window, clamped to sane bounds.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub skip: u32,
    pub limit: Option<u32>,
}

impl PageParams {
    pub fn new(skip: u32, limit: u32) -> Self {
        Self {
            skip,
            limit: Some(limit),
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: None,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub skip: u32,
    pub limit: u32,
    pub has_more: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, params: PageParams) -> Self {
        let limit = params.limit();
        let has_more = (params.skip as u64 + items.len() as u64) < total;
        Self {
            items,
            total,
            skip: params.skip,
            limit,
            has_more,
        }
    }

    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            skip: 0,
            limit: DEFAULT_LIMIT,
            has_more: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_clamped() {
        assert_eq!(PageParams::new(0, 0).limit(), 1);
        assert_eq!(PageParams::new(0, 10_000).limit(), MAX_LIMIT);
        assert_eq!(PageParams::default().limit(), DEFAULT_LIMIT);
    }

    #[test]
    fn has_more_accounts_for_skip() {
        let page = Page::new(vec![1, 2, 3], 10, PageParams::new(0, 3));
        assert!(page.has_more);
        let last = Page::new(vec![1], 10, PageParams::new(9, 3));
        assert!(!last.has_more);
    }
}
