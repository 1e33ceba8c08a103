use serde::{Deserialize, Serialize};

use super::Deal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub current_page: u32,
    pub page_count: u32,
    pub count: usize,
}

impl Default for PaginationMeta {
    fn default() -> Self {
        Self {
            current_page: 1,
            page_count: 1,
            count: 0,
        }
    }
}

impl PaginationMeta {
    pub fn new(current_page: u32, page_count: u32, count: usize) -> Self {
        Self {
            current_page,
            page_count,
            count,
        }
        .normalized()
    }

    /// Restores `1 <= current_page <= page_count` on values received from a
    /// remote source.
    pub fn normalized(self) -> Self {
        let page_count = self.page_count.max(1);
        Self {
            current_page: self.current_page.clamp(1, page_count),
            page_count,
            count: self.count,
        }
    }
}

/// Page request sent to a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageQuery {
    pub page: u32,
    pub size: u32,
}

impl PageQuery {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page: page.max(1),
            size: size.max(1),
        }
    }
}

/// One fetched page: the unit a store load replaces.
#[derive(Debug, Clone, PartialEq)]
pub struct DealPage {
    pub deals: Vec<Deal>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_clamps_current_page() {
        let meta = PaginationMeta::new(9, 3, 40);
        assert_eq!(meta.current_page, 3);
        assert_eq!(meta.page_count, 3);

        let meta = PaginationMeta::new(0, 0, 0);
        assert_eq!(meta.current_page, 1);
        assert_eq!(meta.page_count, 1);
    }

    #[test]
    fn meta_uses_camel_case_keys() {
        let meta: PaginationMeta =
            serde_json::from_str(r#"{"currentPage":2,"pageCount":5,"count":30}"#).unwrap();
        assert_eq!(meta, PaginationMeta::new(2, 5, 30));
    }
}
