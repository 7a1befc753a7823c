use std::ops::Range;

use serde::Serialize;

/// One slice of a result list. A `page_size` of 0 means "everything on page 0".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub has_more: bool,
}

pub fn page_range(total: usize, page: usize, page_size: usize) -> Range<usize> {
    if page_size == 0 {
        return if page == 0 { 0..total } else { total..total };
    }
    let start = page.saturating_mul(page_size).min(total);
    let end = start.saturating_add(page_size).min(total);
    start..end
}

pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let range = page_range(items.len(), page, page_size);
    let has_more = range.end < items.len();
    Page {
        items: items[range].to_vec(),
        page,
        page_size,
        total: items.len(),
        has_more,
    }
}

/// Incremental loading state for infinite scroll.
///
/// `begin_load` hands out the next range only when nothing is in flight and more
/// items remain; `finish_load` releases the guard. Any filter change calls `reset`.
#[derive(Debug, Clone)]
pub struct InfiniteScroll {
    page_size: usize,
    total: usize,
    next_page: usize,
    has_more: bool,
    loading: bool,
}

impl InfiniteScroll {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size,
            total: 0,
            next_page: 0,
            has_more: false,
            loading: false,
        }
    }

    pub fn reset(&mut self, total: usize) {
        self.total = total;
        self.next_page = 0;
        self.has_more = total > 0;
        self.loading = false;
    }

    pub fn begin_load(&mut self) -> Option<Range<usize>> {
        if self.loading || !self.has_more {
            return None;
        }
        self.loading = true;
        Some(page_range(self.total, self.next_page, self.page_size))
    }

    pub fn finish_load(&mut self) {
        if !self.loading {
            return;
        }
        self.loading = false;
        let loaded_end = page_range(self.total, self.next_page, self.page_size).end;
        self.next_page += 1;
        self.has_more = loaded_end < self.total;
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Pages loaded since the last reset.
    pub fn pages_loaded(&self) -> usize {
        self.next_page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paginate_slices_and_flags_remaining_items() {
        let items: Vec<u32> = (0..5).collect();

        let first = paginate(&items, 0, 2);
        assert_eq!(first.items, [0, 1]);
        assert!(first.has_more);

        let last = paginate(&items, 2, 2);
        assert_eq!(last.items, [4]);
        assert!(!last.has_more);

        let beyond = paginate(&items, 9, 2);
        assert!(beyond.items.is_empty());
        assert!(!beyond.has_more);
        assert_eq!(beyond.total, 5);
    }

    #[test]
    fn zero_page_size_renders_everything_at_once() {
        let items: Vec<u32> = (0..5).collect();
        let page = paginate(&items, 0, 0);
        assert_eq!(page.items, items);
        assert!(!page.has_more);
        assert!(paginate(&items, 1, 0).items.is_empty());
    }

    #[test]
    fn busy_flag_blocks_concurrent_loads() {
        let mut scroll = InfiniteScroll::new(2);
        scroll.reset(5);

        assert_eq!(scroll.begin_load(), Some(0..2));
        assert!(scroll.is_loading());
        assert_eq!(scroll.begin_load(), None);
        scroll.finish_load();

        assert_eq!(scroll.begin_load(), Some(2..4));
        scroll.finish_load();
        assert_eq!(scroll.begin_load(), Some(4..5));
        scroll.finish_load();

        assert!(!scroll.has_more());
        assert_eq!(scroll.begin_load(), None);
        assert_eq!(scroll.pages_loaded(), 3);
    }

    #[test]
    fn reset_starts_over() {
        let mut scroll = InfiniteScroll::new(3);
        scroll.reset(4);
        scroll.begin_load();
        scroll.reset(1);
        assert!(!scroll.is_loading());
        assert_eq!(scroll.pages_loaded(), 0);
        assert_eq!(scroll.begin_load(), Some(0..1));
        scroll.finish_load();
        assert!(!scroll.has_more());
    }

    #[test]
    fn empty_result_has_nothing_to_load() {
        let mut scroll = InfiniteScroll::new(3);
        scroll.reset(0);
        assert!(!scroll.has_more());
        assert_eq!(scroll.begin_load(), None);
    }

    #[test]
    fn finish_without_begin_is_ignored() {
        let mut scroll = InfiniteScroll::new(2);
        scroll.reset(4);
        scroll.finish_load();
        assert_eq!(scroll.pages_loaded(), 0);
        assert_eq!(scroll.begin_load(), Some(0..2));
    }
}
