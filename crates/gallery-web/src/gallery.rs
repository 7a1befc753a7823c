/// Gallery pipeline state.
///
/// Holds the catalog, the current filter, the filtered result and the infinite-scroll
/// cursor. Every filter change recomputes the result and resets paging, so the visible
/// list is always rebuilt from the first page.
///
/// Two ways to read it out: `page_view` serves one stateless page and backs the HTTP
/// API; `load_more` and `view` are the host page's incremental model, where one
/// long-lived `Gallery` appends pages as the user scrolls.
use std::sync::Arc;

use crate::catalog::{Catalog, TemplateRecord};
use crate::filter::{filter_indices, FilterState};
use crate::pagination::{paginate, InfiniteScroll};
use crate::view::{
    active_tag_chips, category_options, total_badge, CardView, GalleryView, ResultsInfo,
};

pub struct Gallery {
    catalog: Arc<Catalog>,
    filter: FilterState,
    filtered: Vec<usize>,
    visible: Vec<usize>,
    scroll: InfiniteScroll,
    page_size: usize,
}

impl Gallery {
    /// `page_size` 0 shows the whole filtered list at once.
    pub fn new(catalog: Arc<Catalog>, page_size: usize) -> Self {
        Self::with_filter(catalog, page_size, FilterState::default())
    }

    pub fn with_filter(catalog: Arc<Catalog>, page_size: usize, filter: FilterState) -> Self {
        let mut gallery = Self {
            catalog,
            filter,
            filtered: Vec::new(),
            visible: Vec::new(),
            scroll: InfiniteScroll::new(page_size),
            page_size,
        };
        gallery.refresh();
        gallery
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.filter.set_search(search);
        self.refresh();
    }

    pub fn set_category(&mut self, category: &str) {
        self.filter.set_category(category);
        self.refresh();
    }

    pub fn add_tag(&mut self, tag: &str) -> bool {
        let added = self.filter.add_tag(tag);
        if added {
            self.refresh();
        }
        added
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let removed = self.filter.remove_tag(tag);
        if removed {
            self.refresh();
        }
        removed
    }

    pub fn reset_filters(&mut self) {
        self.filter.reset();
        self.refresh();
    }

    /// Append the next page to the visible list. Returns false when nothing was loaded.
    ///
    /// Called by the host page when the scroll sentinel comes into view.
    pub fn load_more(&mut self) -> bool {
        let Some(range) = self.scroll.begin_load() else {
            return false;
        };
        self.visible.extend_from_slice(&self.filtered[range]);
        self.scroll.finish_load();
        true
    }

    pub fn has_more(&self) -> bool {
        self.scroll.has_more()
    }

    pub fn filtered(&self) -> impl Iterator<Item = &TemplateRecord> {
        self.filtered.iter().map(move |&i| &self.catalog.records()[i])
    }

    pub fn visible_cards(&self) -> Vec<CardView> {
        self.visible
            .iter()
            .map(|&i| CardView::from_record(&self.catalog.records()[i]))
            .collect()
    }

    /// Everything loaded so far through `load_more`.
    pub fn view(&self) -> GalleryView {
        let page = self.scroll.pages_loaded().saturating_sub(1);
        self.build_view(self.visible_cards(), page, self.scroll.has_more())
    }

    /// A single page of the filtered list, independent of the scroll cursor.
    pub fn page_view(&self, page: usize) -> GalleryView {
        let records: Vec<&TemplateRecord> = self.filtered().collect();
        let slice = paginate(&records, page, self.page_size);
        let cards = slice.items.into_iter().map(CardView::from_record).collect();
        self.build_view(cards, slice.page, slice.has_more)
    }

    fn refresh(&mut self) {
        self.filtered = filter_indices(self.catalog.records(), &self.filter);
        self.visible.clear();
        self.scroll.reset(self.filtered.len());
        self.load_more();
    }

    fn build_view(&self, cards: Vec<CardView>, page: usize, has_more: bool) -> GalleryView {
        let total = self.catalog.records().len();
        GalleryView {
            search: self.filter.search().to_string(),
            category: self.filter.category().as_str().to_string(),
            active_tags: active_tag_chips(&self.filter),
            categories: category_options(&self.catalog, self.filter.category()),
            results: ResultsInfo::new(self.filtered.len(), total),
            total_badge: total_badge(total),
            cards,
            page,
            has_more,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::sample_catalog;

    fn gallery(page_size: usize) -> Gallery {
        Gallery::new(Arc::new(sample_catalog()), page_size)
    }

    fn ids(view: &GalleryView) -> Vec<String> {
        view.cards.iter().map(|c| c.id.clone()).collect()
    }

    #[test]
    fn loads_pages_until_exhausted() {
        let mut g = gallery(2);
        assert_eq!(g.view().cards.len(), 2);
        assert!(g.has_more());

        assert!(g.load_more());
        assert!(g.load_more());
        let view = g.view();
        assert_eq!(view.cards.len(), 5);
        assert_eq!(view.page, 2);
        assert!(!view.has_more);
        assert!(!g.load_more());
    }

    #[test]
    fn zero_page_size_shows_everything() {
        let g = gallery(0);
        let view = g.view();
        assert_eq!(view.cards.len(), 5);
        assert!(!view.has_more);
        assert_eq!(view.results.text, "Showing all 5 templates");
        assert_eq!(view.total_badge, "5+");
    }

    #[test]
    fn filter_change_restarts_from_first_page() {
        let mut g = gallery(1);
        g.load_more();
        g.load_more();
        assert_eq!(g.view().cards.len(), 3);

        g.set_category("minimalistic");
        let view = g.view();
        assert_eq!(ids(&view), ["minimalistic-alice"]);
        assert_eq!(view.results.text, "Showing 2 of 5 templates");
        assert!(view.has_more);
    }

    #[test]
    fn duplicate_tag_keeps_current_pages() {
        let mut g = gallery(1);
        assert!(g.add_tag("docker"));
        g.load_more();
        assert_eq!(g.view().cards.len(), 2);

        assert!(!g.add_tag("Docker"));
        assert_eq!(g.view().cards.len(), 2);
        assert_eq!(g.view().active_tags.len(), 1);
    }

    #[test]
    fn no_results_view() {
        let mut g = gallery(2);
        g.set_search("nobody");
        let view = g.view();
        assert!(view.cards.is_empty());
        assert!(view.results.no_results);
        assert!(!view.has_more);

        g.reset_filters();
        assert_eq!(g.view().results.showing, 5);
    }

    #[test]
    fn page_view_is_independent_of_scroll() {
        let mut g = gallery(2);
        g.add_tag("rust");
        g.remove_tag("rust");
        let second = g.page_view(1);
        assert_eq!(ids(&second), ["minimalistic-alice", "minimalistic-carol"]);
        assert!(second.has_more);
        let last = g.page_view(2);
        assert_eq!(ids(&last), ["others-erin"]);
        assert!(!last.has_more);
    }
}
