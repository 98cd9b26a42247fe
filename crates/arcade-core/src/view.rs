//! Filtered, sorted and paginated slices of the catalog
//!
//! `derive_page` is a pure function of its inputs. `ViewState` carries the
//! user's current selection and knows when the page index has to go back to 1.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::catalog::{by_newest, by_popularity};
use crate::live::LiveCatalog;
use crate::model::{CatalogEntry, Category, Language};

/// Default grid page size
pub const DEFAULT_PAGE_SIZE: usize = 24;

/// Conjunctive entry filter. `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    pub category: Option<Category>,
    /// Any one of these categories (collection pages)
    pub categories: Option<BTreeSet<Category>>,
    pub tag: Option<String>,
    /// Case-insensitive substring over both localized names
    pub search: Option<String>,
    /// Restrict to these ids (favorites page)
    pub ids: Option<BTreeSet<u32>>,
}

impl CatalogFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn categories(mut self, categories: impl IntoIterator<Item = Category>) -> Self {
        self.categories = Some(categories.into_iter().collect());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn search(mut self, query: impl Into<String>) -> Self {
        self.search = Some(query.into());
        self
    }

    pub fn ids(mut self, ids: impl IntoIterator<Item = u32>) -> Self {
        self.ids = Some(ids.into_iter().collect());
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, entry: &CatalogEntry) -> bool {
        if self.category.is_some_and(|c| c != entry.category) {
            return false;
        }
        if let Some(categories) = &self.categories {
            if !categories.contains(&entry.category) {
                return false;
            }
        }
        if let Some(tag) = &self.tag {
            if !entry.has_tag(tag) {
                return false;
            }
        }
        if let Some(query) = &self.search {
            let needle = query.trim().to_lowercase();
            if !entry.name.contains_lowercase(&needle) {
                return false;
            }
        }
        if let Some(ids) = &self.ids {
            if !ids.contains(&entry.id) {
                return false;
            }
        }
        true
    }
}

/// Built-in orderings. Ties always fall back to ascending id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Popular,
    Newest,
    Name(Language),
}

impl SortOrder {
    pub fn compare(&self, a: &CatalogEntry, b: &CatalogEntry) -> Ordering {
        match self {
            SortOrder::Popular => by_popularity(a, b),
            SortOrder::Newest => by_newest(a, b),
            SortOrder::Name(language) => a
                .name
                .get(*language)
                .to_lowercase()
                .cmp(&b.name.get(*language).to_lowercase()),
        }
    }
}

/// One page of matching entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub entries: Vec<CatalogEntry>,
    /// 1-based, already clamped
    pub page_index: usize,
    pub total_pages: usize,
    pub total_matches: usize,
}

impl Page {
    pub fn has_prev(&self) -> bool {
        self.page_index > 1
    }

    pub fn has_next(&self) -> bool {
        self.page_index < self.total_pages
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Number of pages for `total` matches. A page size of 0 means "everything on
/// one page".
pub fn page_count(total: usize, page_size: usize) -> usize {
    if total == 0 {
        0
    } else if page_size == 0 {
        1
    } else {
        total.div_ceil(page_size)
    }
}

/// Clamp a requested page into `[1, max(1, page_count)]`
pub fn clamp_page(page_index: usize, total: usize, page_size: usize) -> usize {
    page_index.clamp(1, page_count(total, page_size).max(1))
}

/// Filter, sort with a built-in order, and cut out one page
pub fn derive_page<'a>(
    entries: impl IntoIterator<Item = &'a CatalogEntry>,
    filter: &CatalogFilter,
    sort: SortOrder,
    page_size: usize,
    page_index: usize,
) -> Page {
    derive_page_by(entries, filter, |a, b| sort.compare(a, b), page_size, page_index)
}

/// Same as `derive_page` with a caller-supplied comparator
pub fn derive_page_by<'a, F>(
    entries: impl IntoIterator<Item = &'a CatalogEntry>,
    filter: &CatalogFilter,
    compare: F,
    page_size: usize,
    page_index: usize,
) -> Page
where
    F: Fn(&CatalogEntry, &CatalogEntry) -> Ordering,
{
    let mut matches: Vec<&CatalogEntry> = entries.into_iter().filter(|e| filter.matches(e)).collect();
    matches.sort_by(|a, b| compare(a, b).then_with(|| a.id.cmp(&b.id)));

    let total_matches = matches.len();
    let total_pages = page_count(total_matches, page_size);
    let page_index = clamp_page(page_index, total_matches, page_size);

    let entries = if page_size == 0 {
        matches.into_iter().cloned().collect()
    } else {
        matches
            .into_iter()
            .skip((page_index - 1) * page_size)
            .take(page_size)
            .cloned()
            .collect()
    };

    Page {
        entries,
        page_index,
        total_pages,
        total_matches,
    }
}

/// The user's current view selection over a live catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    filter: CatalogFilter,
    sort: SortOrder,
    page_size: usize,
    page_index: usize,
    catalog_revision: u64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl ViewState {
    pub fn new(page_size: usize) -> Self {
        Self {
            filter: CatalogFilter::default(),
            sort: SortOrder::default(),
            page_size,
            page_index: 1,
            catalog_revision: 0,
        }
    }

    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_filter(mut self, filter: CatalogFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn filter(&self) -> &CatalogFilter {
        &self.filter
    }

    pub fn sort(&self) -> SortOrder {
        self.sort
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    /// Replace the filter; a different filter sends the view back to page 1
    pub fn set_filter(&mut self, filter: CatalogFilter) {
        if filter != self.filter {
            self.filter = filter;
            self.page_index = 1;
        }
    }

    /// Edit the filter in place, with the same reset rule as `set_filter`
    pub fn update_filter(&mut self, edit: impl FnOnce(&mut CatalogFilter)) {
        let mut next = self.filter.clone();
        edit(&mut next);
        self.set_filter(next);
    }

    pub fn set_sort(&mut self, sort: SortOrder) {
        if sort != self.sort {
            self.sort = sort;
            self.page_index = 1;
        }
    }

    pub fn go_to(&mut self, page_index: usize) {
        self.page_index = page_index.max(1);
    }

    pub fn next_page(&mut self) {
        self.page_index += 1;
    }

    pub fn prev_page(&mut self) {
        self.page_index = self.page_index.saturating_sub(1).max(1);
    }

    /// Note the catalog's current revision. Returns true (and resets to page 1)
    /// when the catalog changed since the last call.
    pub fn observe(&mut self, catalog: &LiveCatalog) -> bool {
        if catalog.revision() == self.catalog_revision {
            return false;
        }
        self.catalog_revision = catalog.revision();
        self.page_index = 1;
        true
    }

    /// Page for the current selection. A catalog not yet `observe`d is read
    /// from page 1.
    pub fn page(&self, catalog: &LiveCatalog) -> Page {
        let index = if catalog.revision() == self.catalog_revision {
            self.page_index
        } else {
            1
        };
        derive_page(catalog.visible(), &self.filter, self.sort, self.page_size, index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::ProbeVerdict;
    use crate::model::fixtures::{game, game_in};

    fn catalog(n: u32) -> Vec<CatalogEntry> {
        (1..=n).map(|id| game(id, u64::from(id) * 10)).collect()
    }

    #[test]
    fn test_pagination_boundary() {
        let entries = catalog(25);
        let filter = CatalogFilter::new();

        let first = derive_page(&entries, &filter, SortOrder::Popular, 24, 1);
        assert_eq!(first.entries.len(), 24);
        assert_eq!(first.total_pages, 2);

        let second = derive_page(&entries, &filter, SortOrder::Popular, 24, 2);
        assert_eq!(second.entries.len(), 1);

        let clamped = derive_page(&entries, &filter, SortOrder::Popular, 24, 3);
        assert_eq!(clamped.page_index, 2);
        assert_eq!(clamped.entries, second.entries);
    }

    #[test]
    fn test_page_size_zero_returns_everything() {
        let entries = catalog(30);
        let page = derive_page(&entries, &CatalogFilter::new(), SortOrder::Newest, 0, 7);
        assert_eq!(page.entries.len(), 30);
        assert_eq!(page.page_index, 1);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn test_empty_result_clamps_to_first_page() {
        let entries = catalog(5);
        let filter = CatalogFilter::new().search("zzz");
        let page = derive_page(&entries, &filter, SortOrder::Popular, 24, 4);
        assert_eq!(page.page_index, 1);
        assert_eq!(page.total_pages, 0);
        assert!(page.is_empty());
        assert!(!page.has_next());
    }

    #[test]
    fn test_filters_compose() {
        let mut a = game_in(1, 10, Category::Puzzle);
        a.tags = vec!["logic".into()];
        a.name.en = "Block Master".into();
        let mut b = game_in(2, 20, Category::Puzzle);
        b.name.en = "Block Party".into();
        let mut c = game_in(3, 30, Category::Racing);
        c.tags = vec!["logic".into()];
        c.name.en = "Block Racer".into();
        let entries = vec![a, b, c];

        let filter = CatalogFilter::new()
            .category(Category::Puzzle)
            .tag("Logic")
            .search("BLOCK");
        let page = derive_page(&entries, &filter, SortOrder::Popular, 24, 1);
        let ids: Vec<u32> = page.entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1]);

        let favorites = CatalogFilter::new().ids([2, 3]);
        let page = derive_page(&entries, &favorites, SortOrder::Newest, 24, 1);
        let ids: Vec<u32> = page.entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[test]
    fn test_category_collection_matches_any_member() {
        let entries = vec![
            game_in(1, 10, Category::Action),
            game_in(2, 50, Category::Puzzle),
            game_in(3, 30, Category::Racing),
            game_in(4, 40, Category::Adventure),
        ];
        let filter = CatalogFilter::new().categories(Category::BOYS);
        let page = derive_page(&entries, &filter, SortOrder::Popular, 24, 1);
        let ids: Vec<u32> = page.entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![4, 3, 1]);

        let narrowed = filter.category(Category::Racing);
        assert_eq!(derive_page(&entries, &narrowed, SortOrder::Popular, 24, 1).total_matches, 1);
    }

    #[test]
    fn test_search_matches_arabic_name() {
        let entries = vec![game(1, 0), game(2, 0)];
        let page = derive_page(&entries, &CatalogFilter::new().search("لعبة 2"), SortOrder::Popular, 24, 1);
        assert_eq!(page.total_matches, 1);
    }

    #[test]
    fn test_derive_page_is_deterministic() {
        let entries: Vec<CatalogEntry> = (1..=40).map(|id| game(id, u64::from(id % 3))).collect();
        let filter = CatalogFilter::new();
        let a = derive_page(&entries, &filter, SortOrder::Popular, 12, 2);
        let b = derive_page(&entries, &filter, SortOrder::Popular, 12, 2);
        assert_eq!(a, b);
    }

    #[test]
    fn test_custom_comparator_ties_by_id() {
        let entries = vec![game(3, 0), game(1, 0), game(2, 0)];
        let page = derive_page_by(&entries, &CatalogFilter::new(), |_, _| Ordering::Equal, 0, 1);
        let ids: Vec<u32> = page.entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_filter_narrowing_resets_page() {
        let entries: Vec<CatalogEntry> = (1..=100)
            .map(|id| {
                let category = if id <= 10 { Category::Sports } else { Category::Action };
                game_in(id, u64::from(id), category)
            })
            .collect();
        let live = LiveCatalog::new(entries);
        let mut view = ViewState::new(24);
        view.observe(&live);
        view.go_to(3);
        assert_eq!(view.page(&live).page_index, 3);

        view.update_filter(|f| f.category = Some(Category::Sports));
        assert_eq!(view.page_index(), 1);
        let page = view.page(&live);
        assert_eq!(page.page_index, 1);
        assert_eq!(page.total_matches, 10);
    }

    #[test]
    fn test_unchanged_filter_keeps_page() {
        let mut view = ViewState::new(24);
        view.go_to(2);
        view.set_filter(CatalogFilter::new());
        assert_eq!(view.page_index(), 2);
    }

    #[test]
    fn test_catalog_change_resets_page() {
        let mut live = LiveCatalog::new(catalog(60));
        let mut view = ViewState::new(24);
        view.observe(&live);
        view.go_to(2);

        live.apply_verdict(5, ProbeVerdict::Failed);
        let page = view.page(&live);
        assert_eq!(page.page_index, 1);
        assert!(page.entries.iter().all(|e| e.id != 5));

        assert!(view.observe(&live));
        assert_eq!(view.page_index(), 1);
        assert!(!view.observe(&live));
    }
}
