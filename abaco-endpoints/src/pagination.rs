//! Pagination metadata.
//!
//! Paginated endpoints describe their position in a `pagination` or `meta`
//! block, or at the top level of the envelope. Field names vary, so several
//! spellings are accepted.

use serde_json::{Map, Value};

const CURRENT_KEYS: &[&str] = &["current_page", "page"];
const TOTAL_KEYS: &[&str] = &["total_pages", "last_page", "pages"];
const NEXT_KEYS: &[&str] = &["next_page"];
const HAS_MORE_KEYS: &[&str] = &["has_more", "has_next", "has_next_page"];

/// Position of a response within a paginated listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageInfo {
    /// Page this response holds.
    pub current: Option<u32>,
    /// Total number of pages.
    pub total: Option<u32>,
    /// Explicit next page number.
    pub next: Option<u32>,
    /// Whether more pages follow.
    pub has_more: Option<bool>,
}

impl PageInfo {
    /// Reads pagination metadata from a response body. Returns `None` when
    /// the body carries none.
    pub fn from_body(body: &Value) -> Option<Self> {
        let root = body.as_object()?;
        ["pagination", "meta"]
            .iter()
            .filter_map(|key| root.get(*key).and_then(Value::as_object))
            .chain(std::iter::once(root))
            .map(Self::from_map)
            .find(|info| *info != Self::default())
    }

    fn from_map(map: &Map<String, Value>) -> Self {
        Self {
            current: number(map, CURRENT_KEYS),
            total: number(map, TOTAL_KEYS),
            next: number(map, NEXT_KEYS),
            has_more: HAS_MORE_KEYS
                .iter()
                .find_map(|k| map.get(*k).and_then(Value::as_bool)),
        }
    }

    /// Page to request after `requested`, if any.
    ///
    /// Never returns a page at or before `requested`, so a server that
    /// keeps answering with the same page cannot loop the fetcher.
    pub fn next_after(&self, requested: u32) -> Option<u32> {
        let current = self.current.unwrap_or(requested);
        let candidate = if let Some(next) = self.next {
            Some(next)
        } else if let Some(total) = self.total {
            current.checked_add(1).filter(|next| *next <= total)
        } else if self.has_more == Some(true) {
            current.checked_add(1)
        } else {
            None
        };
        candidate.filter(|next| *next > requested)
    }
}

fn number(map: &Map<String, Value>, keys: &[&str]) -> Option<u32> {
    keys.iter().find_map(|k| match map.get(*k)? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_no_metadata() {
        assert_eq!(PageInfo::from_body(&json!({"transactions": []})), None);
        assert_eq!(PageInfo::from_body(&json!([1, 2])), None);
    }

    #[test]
    fn test_pagination_block_with_totals() {
        let body = json!({"transactions": [], "pagination": {"current_page": 1, "total_pages": 3}});
        let info = PageInfo::from_body(&body).unwrap();
        assert_eq!(info.next_after(1), Some(2));

        let last = json!({"meta": {"page": 3, "last_page": 3}});
        assert_eq!(PageInfo::from_body(&last).unwrap().next_after(3), None);
    }

    #[test]
    fn test_top_level_has_more() {
        let body = json!({"data": [], "page": "2", "has_more": true});
        assert_eq!(PageInfo::from_body(&body).unwrap().next_after(2), Some(3));
    }

    #[test]
    fn test_explicit_next_page_must_advance() {
        let body = json!({"pagination": {"next_page": 2}});
        let info = PageInfo::from_body(&body).unwrap();
        assert_eq!(info.next_after(1), Some(2));
        assert_eq!(info.next_after(2), None);
    }

    #[test]
    fn test_last_representable_page_ends_listing() {
        let body = json!({"pagination": {"current_page": u32::MAX, "has_more": true}});
        let info = PageInfo::from_body(&body).unwrap();
        assert_eq!(info.next_after(1), None);

        let totals = json!({"pagination": {"current_page": u32::MAX, "total_pages": u32::MAX}});
        assert_eq!(PageInfo::from_body(&totals).unwrap().next_after(1), None);
    }
}
