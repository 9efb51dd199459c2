//! Permissive pagination handling: bad input never errors, it defaults.

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: i64,
    pub limit: i64,
}

impl PageParams {
    /// Parses raw query values. Unparseable values silently take the
    /// defaults; parsed values are clamped to page ≥ 1, 1 ≤ limit ≤ 100.
    pub fn from_raw(page: Option<&str>, limit: Option<&str>) -> Self {
        let page = parse_or(page, DEFAULT_PAGE);
        let limit = parse_or(limit, DEFAULT_LIMIT);
        Self::normalize(page, limit)
    }

    pub fn normalize(page: i64, limit: i64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_LIMIT),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

fn parse_or(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .unwrap_or(default)
}

/// `ceil(total_items / limit)`; zero items means zero pages.
pub fn total_pages(total_items: i64, limit: i64) -> i64 {
    if total_items <= 0 {
        return 0;
    }
    (total_items + limit - 1) / limit
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_limit_is_clamped_to_max() {
        let params = PageParams::from_raw(Some("1"), Some("500"));
        assert_eq!(params.limit, 100);
    }

    #[test]
    fn page_zero_normalizes_to_one() {
        let params = PageParams::from_raw(Some("0"), Some("20"));
        assert_eq!(params.page, 1);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn unparseable_values_take_defaults_silently() {
        let params = PageParams::from_raw(Some("abc"), Some("??"));
        assert_eq!(params, PageParams::default());
        let params = PageParams::from_raw(None, None);
        assert_eq!(params, PageParams::default());
    }

    #[test]
    fn negative_values_are_clamped() {
        let params = PageParams::from_raw(Some("-3"), Some("-10"));
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, 1);
    }

    #[test]
    fn offset_follows_page_and_limit() {
        let params = PageParams::from_raw(Some("2"), Some("20"));
        assert_eq!(params.offset(), 20);
        let params = PageParams::from_raw(Some("3"), Some("7"));
        assert_eq!(params.offset(), 14);
    }

    #[test]
    fn total_pages_is_ceiling_division() {
        assert_eq!(total_pages(45, 20), 3);
        assert_eq!(total_pages(40, 20), 2);
        assert_eq!(total_pages(1, 20), 1);
        assert_eq!(total_pages(0, 20), 0);
    }
}
