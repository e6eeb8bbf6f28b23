//! Page navigation model.
//!
//! The window always shows the first page and the last two pages, the pages
//! adjacent to the current one, and an ellipsis wherever a gap is skipped.

use shared::{PaginationMeta, ResultPage};

/// One element of the page navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageIndicator {
    Page(u32),
    Ellipsis,
}

/// Compute the abbreviated page list for `current_page` out of `last_page`.
///
/// `current_page` must already be clamped to `[1, last_page]`. Callers hide
/// the controls when `last_page <= 1`; in that case the result is just page 1.
pub fn compute_window(current_page: u32, last_page: u32) -> Vec<PageIndicator> {
    if last_page <= 1 {
        return vec![PageIndicator::Page(1)];
    }

    let current = i64::from(current_page);
    let last = i64::from(last_page);

    let start = 2i64.max(current - 1);
    let end = (last - 2).min(current + 1);

    let mut window = vec![PageIndicator::Page(1)];

    if start > 2 {
        window.push(PageIndicator::Ellipsis);
    }

    // start >= 2 and end <= last - 2, so both fit in u32
    window.extend((start..=end).map(|page| PageIndicator::Page(page as u32)));

    if end < last - 2 {
        window.push(PageIndicator::Ellipsis);
    }
    if last - 1 > end && last - 1 > 1 {
        window.push(PageIndicator::Page(last_page - 1));
    }
    if last > end {
        window.push(PageIndicator::Page(last_page));
    }

    window
}

/// Navigation controls for a result page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageControls {
    pub window: Vec<PageIndicator>,
    pub current: u32,
    pub last: u32,
    pub has_previous: bool,
    pub has_next: bool,
}

impl PageControls {
    /// Controls for `results`, or `None` when there is nothing to page through
    pub fn for_results(results: &ResultPage) -> Option<Self> {
        let meta = results.pagination?;
        if results.items.is_empty() {
            return None;
        }
        Self::from_meta(&meta)
    }

    pub fn from_meta(meta: &PaginationMeta) -> Option<Self> {
        if meta.last_page <= 1 {
            return None;
        }

        let current = meta.current_page.clamp(1, meta.last_page);
        Some(Self {
            window: compute_window(current, meta.last_page),
            current,
            last: meta.last_page,
            has_previous: current > 1,
            has_next: current < meta.last_page,
        })
    }
}
