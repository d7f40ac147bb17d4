//! Shared DTO helpers for the v1 API.

use crate::api::v1::response::ResponseMeta;

/// Resolved cursor pagination: `limit` clamped to `1..=100` (default 20),
/// cursor interpreted as a 1-based page number.
#[derive(Debug, Clone, Copy)]
pub struct PageParams {
    pub limit: u32,
    pub page: u32,
    pub offset: u32,
}

impl PageParams {
    pub fn resolve(limit: Option<u32>, cursor: Option<&str>) -> Self {
        let limit = limit.unwrap_or(20).clamp(1, 100);
        let page = cursor
            .and_then(|c| c.parse::<u32>().ok())
            .filter(|page| *page >= 1)
            .unwrap_or(1);
        Self {
            limit,
            page,
            offset: (page - 1) * limit,
        }
    }

    /// Pagination metadata for a page with `total` matching rows.
    pub fn meta(&self, total: u64) -> ResponseMeta {
        let has_more = total > (self.offset + self.limit) as u64;
        ResponseMeta {
            next_cursor: has_more.then(|| (self.page + 1).to_string()),
            total: Some(total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_first_page_of_twenty() {
        let params = PageParams::resolve(None, None);
        assert_eq!(params.limit, 20);
        assert_eq!(params.page, 1);
        assert_eq!(params.offset, 0);
    }

    #[test]
    fn clamps_limit_and_parses_cursor() {
        let params = PageParams::resolve(Some(500), Some("3"));
        assert_eq!(params.limit, 100);
        assert_eq!(params.page, 3);
        assert_eq!(params.offset, 200);
    }

    #[test]
    fn invalid_cursor_falls_back_to_first_page() {
        let params = PageParams::resolve(Some(10), Some("zero"));
        assert_eq!(params.page, 1);
        let params = PageParams::resolve(Some(10), Some("0"));
        assert_eq!(params.page, 1);
    }

    #[test]
    fn meta_reports_next_cursor_only_when_more_rows_exist() {
        let params = PageParams::resolve(Some(10), None);
        assert_eq!(params.meta(25).next_cursor, Some("2".to_string()));
        assert_eq!(params.meta(10).next_cursor, None);
        assert_eq!(params.meta(25).total, Some(25));
    }
}
