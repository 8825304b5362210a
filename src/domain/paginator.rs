use serde::{Deserialize, Serialize};

use crate::domain::types::lenient_usize;

/// Page size used when the server does not report one.
pub const DEFAULT_ITEMS_PER_PAGE: usize = 10;

/// Server's view of a collection window.
///
/// Always built through [`Paginator::from_wire`] or one of the helper
/// constructors so the invariants below hold:
/// `1 <= current_page <= total_pages`, `records_per_page > 0` and
/// `current_page_item_count <= records_per_page`.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Paginator {
    pub current_page: usize,
    pub total_pages: usize,
    pub records_per_page: usize,
    pub current_page_item_count: usize,
    pub total_count: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

/// Paginator block as the remote API sends it.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct WirePaginator {
    #[serde(default, deserialize_with = "lenient_usize")]
    pub current_page: Option<usize>,
    #[serde(default, deserialize_with = "lenient_usize")]
    pub total_pages: Option<usize>,
    #[serde(default, deserialize_with = "lenient_usize")]
    pub record_per_page: Option<usize>,
    #[serde(default, deserialize_with = "lenient_usize")]
    pub current_page_items_count: Option<usize>,
    #[serde(default, deserialize_with = "lenient_usize")]
    pub total_count: Option<usize>,
    #[serde(default)]
    pub previous_page_url: Option<String>,
    #[serde(default)]
    pub next_page_url: Option<String>,
}

impl Paginator {
    /// Clamps a wire paginator into a valid value.
    pub fn from_wire(wire: WirePaginator) -> Self {
        let total_pages = wire.total_pages.unwrap_or(1).max(1);
        let current_page = wire.current_page.unwrap_or(1).clamp(1, total_pages);
        let records_per_page = match wire.record_per_page {
            Some(0) | None => DEFAULT_ITEMS_PER_PAGE,
            Some(n) => n,
        };
        let current_page_item_count = wire
            .current_page_items_count
            .unwrap_or(0)
            .min(records_per_page);

        Self {
            current_page,
            total_pages,
            records_per_page,
            current_page_item_count,
            total_count: wire.total_count.unwrap_or(0),
            has_previous: has_link(wire.previous_page_url.as_deref()),
            has_next: has_link(wire.next_page_url.as_deref()),
        }
    }

    /// Describes a response that carried every record at once.
    pub fn single_page(item_count: usize) -> Self {
        Self {
            current_page: 1,
            total_pages: 1,
            records_per_page: item_count.max(1),
            current_page_item_count: item_count,
            total_count: item_count,
            has_previous: false,
            has_next: false,
        }
    }

    /// Window before anything has been fetched.
    pub fn empty() -> Self {
        Self::single_page(0)
    }

    /// One-based inclusive range of records shown on this page, if any.
    /// Saturates instead of overflowing on absurd server counts.
    pub fn range(&self) -> Option<(usize, usize)> {
        if self.current_page_item_count == 0 {
            return None;
        }
        let start = self
            .current_page
            .saturating_sub(1)
            .saturating_mul(self.records_per_page)
            .saturating_add(1);
        Some((
            start,
            start.saturating_add(self.current_page_item_count - 1),
        ))
    }

    /// Clamps a requested page number into `[1, total_pages]`.
    pub fn clamp_page(&self, page: usize) -> usize {
        page.clamp(1, self.total_pages)
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self::empty()
    }
}

fn has_link(url: Option<&str>) -> bool {
    url.is_some_and(|u| !u.trim().is_empty())
}
