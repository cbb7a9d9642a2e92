// Copyright 2025 Cowboy AI, LLC.

//! Paging over ordered collections held locally
//!
//! The remote policy service returns the entries of a workflow, the collection
//! ids of a sequence and the children of a condition as one unpaged block.
//! [`PageRequest`] normalizes caller supplied paging parameters and
//! [`project`] slices such a block into the requested page.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Validated paging parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Zero-based index of the first item on the page
    pub start: usize,
    /// Maximum number of items on the page
    pub page_size: usize,
}

impl PageRequest {
    /// Normalize caller paging input
    ///
    /// A page number below 1 (or none) selects the first page. A negative or
    /// missing page size falls back to `default_page_size`.
    pub fn validated(page_num: Option<i64>, page_size: Option<i64>, default_page_size: usize) -> Self {
        let page_num = match page_num {
            Some(n) if n >= 1 => n as usize,
            _ => 1,
        };
        let page_size = match page_size {
            Some(n) if n >= 0 => n as usize,
            _ => default_page_size,
        };
        Self {
            start: (page_num - 1).saturating_mul(page_size),
            page_size,
        }
    }

    /// A request covering `len` items from the beginning
    pub fn first(len: usize) -> Self {
        Self {
            start: 0,
            page_size: len,
        }
    }

    /// Exclusive end index of the page
    pub fn end(&self) -> usize {
        self.start.saturating_add(self.page_size)
    }

    /// Start index in the one-based form the remote service expects
    pub fn remote_start(&self) -> usize {
        self.start + 1
    }

    /// Index range selected from a sequence of `len` items
    pub fn range(&self, len: usize) -> std::ops::Range<usize> {
        if self.page_size == 0 || self.start >= len {
            return 0..0;
        }
        self.start..self.end().min(len)
    }
}

/// One page of results together with the size of the whole collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page, in collection order
    pub items: Vec<T>,
    /// Number of items across all pages
    pub total_hits: usize,
}

impl<T> Page<T> {
    /// Create a page
    pub fn new(items: Vec<T>, total_hits: usize) -> Self {
        Self { items, total_hits }
    }

    /// An empty page that still reports the collection size
    pub fn empty(total_hits: usize) -> Self {
        Self {
            items: Vec::new(),
            total_hits,
        }
    }

    /// Map the items to a different type
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_hits: self.total_hits,
        }
    }

    /// Whether the page holds no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Materialize the page selected by `request`, passing every selected item
/// through `f` in page order
pub fn project<T, U, F>(items: &[T], request: PageRequest, f: F) -> Page<U>
where
    F: FnMut(&T) -> U,
{
    let total = items.len();
    let selected = items[request.range(total)].iter().map(f).collect();
    Page::new(selected, total)
}

/// Clone the page selected by `request`
pub fn page_of<T: Clone>(items: &[T], request: PageRequest) -> Page<T> {
    project(items, request, T::clone)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test_case(None, None => (0, 100) ; "defaults")]
    #[test_case(Some(0), Some(10) => (0, 10) ; "page zero becomes first page")]
    #[test_case(Some(-3), Some(10) => (0, 10) ; "negative page becomes first page")]
    #[test_case(Some(3), Some(10) => (20, 10) ; "third page")]
    #[test_case(Some(2), Some(-1) => (100, 100) ; "negative size uses default")]
    #[test_case(Some(4), Some(0) => (0, 0) ; "zero size")]
    fn test_validated(page_num: Option<i64>, page_size: Option<i64>) -> (usize, usize) {
        let request = PageRequest::validated(page_num, page_size, 100);
        (request.start, request.page_size)
    }

    #[test]
    fn test_second_page_of_ten() {
        let items: Vec<i32> = (0..10).collect();
        let page = page_of(&items, PageRequest::validated(Some(2), Some(3), 100));
        assert_eq!(page.items, vec![3, 4, 5]);
        assert_eq!(page.total_hits, 10);
    }

    #[test]
    fn test_start_beyond_length() {
        let items: Vec<i32> = (0..10).collect();
        let page = page_of(&items, PageRequest::validated(Some(5), Some(3), 100));
        assert!(page.is_empty());
        assert_eq!(page.total_hits, 10);
    }

    #[test]
    fn test_zero_page_size() {
        let items: Vec<i32> = (0..10).collect();
        let page = page_of(&items, PageRequest::validated(Some(1), Some(0), 100));
        assert!(page.is_empty());
        assert_eq!(page.total_hits, 10);
    }

    #[test]
    fn test_projection_runs_in_page_order() {
        let items = vec!["a", "b", "c", "d"];
        let mut seen = Vec::new();
        let page = project(&items, PageRequest::validated(Some(2), Some(2), 100), |item| {
            seen.push(*item);
            item.to_uppercase()
        });
        assert_eq!(seen, vec!["c", "d"]);
        assert_eq!(page.items, vec!["C".to_string(), "D".to_string()]);
    }

    #[test]
    fn test_remote_start_is_one_based() {
        let request = PageRequest::validated(Some(3), Some(5), 100);
        assert_eq!(request.start, 10);
        assert_eq!(request.remote_start(), 11);
    }

    proptest! {
        #[test]
        fn prop_page_is_contiguous_slice(len in 0usize..60, page in -2i64..15, size in -2i64..12) {
            let items: Vec<usize> = (0..len).collect();
            let request = PageRequest::validated(Some(page), Some(size), 7);
            let result = page_of(&items, request);

            prop_assert_eq!(result.total_hits, len);
            prop_assert!(result.items.len() <= request.page_size);
            for (offset, item) in result.items.iter().enumerate() {
                prop_assert_eq!(*item, request.start + offset);
            }
        }
    }
}
