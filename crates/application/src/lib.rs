//! Headless browsing state for Bookstand.
//!
//! Owns the current page and match set so filtering and pagination can be
//! exercised without a terminal. The ui crate renders from this state and
//! never keeps its own copy.

use std::ops::Range;

use bookstand_core::{BookRecord, FilterCriteria, Selector, Settings};

/// Controller state: the last-applied criteria, the match set they produced,
/// and how many pages of it are exposed.
///
/// `matches` holds indices into the catalog's book list, in catalog order,
/// and is reassigned wholesale on every filter submission.
#[derive(Debug, Clone)]
pub struct BrowserContext {
    pub settings: Settings,
    pub criteria: FilterCriteria,
    pub page: usize,
    pub matches: Vec<usize>,
    pub selected: usize,
    page_size: usize,
}

impl BrowserContext {
    pub fn new(settings: Settings, page_size: usize) -> Self {
        Self {
            settings,
            criteria: FilterCriteria::default(),
            page: 1,
            matches: Vec::new(),
            selected: 0,
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// New filter submission: back to page 1 with a fresh match set.
    pub fn reset_and_apply(&mut self, criteria: FilterCriteria, results: Vec<usize>) {
        self.criteria = criteria;
        self.matches = results;
        self.page = 1;
        self.normalize_selection();
    }

    /// Show-more: expose one more page. Tolerates exhausted matches; the
    /// newly exposed slice is then empty.
    pub fn advance(&mut self) {
        self.page += 1;
    }

    /// Number of previews visible right now.
    pub fn visible_count(&self) -> usize {
        (self.page_size * self.page).min(self.matches.len())
    }

    /// Matches hidden behind the show-more control.
    pub fn remaining(&self) -> usize {
        self.matches.len() - self.visible_count()
    }

    pub fn visible_matches(&self) -> &[usize] {
        &self.matches[..self.visible_count()]
    }

    /// The slice of `matches` a given page exposes beyond its predecessors.
    pub fn page_slice(&self, page: usize) -> Range<usize> {
        let start = self.page_size * page.saturating_sub(1);
        let end = (self.page_size * page).min(self.matches.len());
        start.min(end)..end
    }

    /// Catalog index of the currently selected preview, if any.
    pub fn selected_match(&self) -> Option<usize> {
        self.visible_matches().get(self.selected).copied()
    }

    pub fn select_next(&mut self) {
        let visible = self.visible_count();
        if visible > 0 {
            self.selected = (self.selected + 1).min(visible - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn normalize_selection(&mut self) {
        self.selected = self.selected.min(self.visible_count().saturating_sub(1));
    }
}

/// Single pass over the catalog; result preserves catalog order.
pub fn filter_catalog(books: &[BookRecord], criteria: &FilterCriteria) -> Vec<usize> {
    books
        .iter()
        .enumerate()
        .filter(|(_, book)| matches_criteria(book, criteria))
        .map(|(idx, _)| idx)
        .collect()
}

fn matches_criteria(book: &BookRecord, criteria: &FilterCriteria) -> bool {
    matches_genre(book, criteria) && matches_author(book, criteria) && matches_title(book, criteria)
}

fn matches_genre(book: &BookRecord, criteria: &FilterCriteria) -> bool {
    match &criteria.genre {
        Selector::Any => true,
        Selector::Selected(wanted) => book.genres.iter().any(|g| g == wanted),
    }
}

fn matches_author(book: &BookRecord, criteria: &FilterCriteria) -> bool {
    criteria.author.matches(&book.author)
}

fn matches_title(book: &BookRecord, criteria: &FilterCriteria) -> bool {
    let query = criteria.title.trim();
    if query.is_empty() {
        return true;
    }
    book.title
        .to_lowercase()
        .contains(&query.to_lowercase())
}
