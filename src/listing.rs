//! Listing - Search and Pagination
//!
//! TigerStyle: Pure functions over a fetched collection, no I/O.

use crate::model::{Entity, UserDirectory};

/// Records whose searchable fields contain `query`, case-insensitively.
///
/// An empty query keeps every record. Relative order is preserved.
pub fn filter<'a, E: Entity>(
    records: &'a [E],
    query: &str,
    directory: &UserDirectory,
) -> Vec<&'a E> {
    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|record| matches(*record, &needle, directory))
        .collect()
}

/// Check one record against an already lowercased needle.
pub fn matches<E: Entity>(record: &E, needle: &str, directory: &UserDirectory) -> bool {
    needle.is_empty()
        || record
            .search_fields(directory)
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
}

/// Number of pages for `count` items; never less than 1.
pub fn total_pages(count: usize, page_size: usize) -> usize {
    // Precondition
    assert!(page_size > 0, "page size must be positive");

    count.div_ceil(page_size).max(1)
}

/// The slice `[(page-1)*size, page*size)`, clamped to the available items.
///
/// Pages are 1-based; page 0 is treated as page 1. A page past the end is
/// empty.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    // Precondition
    assert!(page_size > 0, "page size must be positive");

    let start = page.max(1).saturating_sub(1).saturating_mul(page_size);
    let start = start.min(items.len());
    let end = start.saturating_add(page_size).min(items.len());

    &items[start..end]
}

/// Position of the visible page within the filtered set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    /// 1-based index of the first visible item (0 when nothing is visible)
    pub first: usize,
    /// 1-based index of the last visible item
    pub last: usize,
    /// Size of the filtered set
    pub total: usize,
}

impl PageRange {
    /// Range of `page` over `total` items.
    pub fn new(page: usize, page_size: usize, total: usize) -> Self {
        let start = page.max(1).saturating_sub(1).saturating_mul(page_size).min(total);
        let last = start.saturating_add(page_size).min(total);
        let first = if last > start { start + 1 } else { 0 };
        Self { first, last, total }
    }
}

impl std::fmt::Display for PageRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Showing {} to {} of {}", self.first, self.last, self.total)
    }
}

// =============================================================================
// Tests
// =============================================================================
