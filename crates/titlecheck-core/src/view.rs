//! View-mode state machine.
//!
//! Which of the three sources backs the table is decided in one place,
//! [`ViewState::derive_mode`], so the precedence rule (non-empty query wins
//! over an upload, an upload wins over plain browsing) is an explicit,
//! tested transition rather than an emergent property of scattered
//! conditionals.

use std::collections::BTreeSet;

use crate::scheduler::FetchSpec;

/// Which source currently backs the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Browse,
    Search,
    UploadedView,
}

/// Pagination cursor, query text and exclusion set for the current view.
///
/// Invariant: `mode == Search` whenever the trimmed query is non-empty;
/// `mode == UploadedView` only when the query is empty and an upload has
/// succeeded; otherwise `mode == Browse`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    mode: ViewMode,
    page: u32,
    total_pages: u32,
    query: String,
    excluded_conference_names: BTreeSet<String>,
    has_upload: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            mode: ViewMode::Browse,
            page: 1,
            total_pages: 1,
            query: String::new(),
            excluded_conference_names: BTreeSet::new(),
            has_upload: false,
        }
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn has_upload(&self) -> bool {
        self.has_upload
    }

    pub fn excluded_conference_names(&self) -> &BTreeSet<String> {
        &self.excluded_conference_names
    }

    fn derive_mode(&mut self) {
        self.mode = if !self.query.trim().is_empty() {
            ViewMode::Search
        } else if self.has_upload {
            ViewMode::UploadedView
        } else {
            ViewMode::Browse
        };
    }

    /// Change the query text. Any change resets the cursor to page 1;
    /// clearing the query falls back to the uploaded view when an upload
    /// exists, else to browsing.
    pub fn set_query(&mut self, query: &str) {
        if self.query == query {
            return;
        }
        self.query = query.to_string();
        self.page = 1;
        self.derive_mode();
    }

    /// Move the cursor, clamped to `[1, total_pages]`.
    pub fn set_page(&mut self, page: u32) {
        self.page = page.clamp(1, self.total_pages.max(1));
    }

    /// Record the page count reported by the last committed fetch.
    pub fn set_total_pages(&mut self, total_pages: u32) {
        self.total_pages = total_pages.max(1);
    }

    /// Transition taken when an upload completes: the uploaded view takes
    /// over, the cursor rewinds and the query is cleared.
    pub fn upload_succeeded(&mut self, total_pages: u32, excluded: BTreeSet<String>) {
        self.has_upload = true;
        self.total_pages = total_pages.max(1);
        self.page = 1;
        self.query.clear();
        self.excluded_conference_names = excluded;
        self.derive_mode();
    }

    /// Explicit reset: back to browsing with everything cleared.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Snapshot of the tuple the scheduler debounces and commits against.
    pub fn fetch_spec(&self) -> FetchSpec {
        FetchSpec {
            query: self.query.clone(),
            page: self.page,
            mode: self.mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_browse() {
        let view = ViewState::new();
        assert_eq!(view.mode(), ViewMode::Browse);
        assert_eq!(view.page(), 1);
        assert_eq!(view.total_pages(), 1);
    }

    #[test]
    fn nonempty_query_enters_search_from_any_state() {
        let mut view = ViewState::new();
        view.set_query("alpha");
        assert_eq!(view.mode(), ViewMode::Search);

        let mut view = ViewState::new();
        view.upload_succeeded(4, BTreeSet::new());
        view.set_query("alpha");
        assert_eq!(view.mode(), ViewMode::Search);
    }

    #[test]
    fn whitespace_query_is_not_search() {
        let mut view = ViewState::new();
        view.set_query("   ");
        assert_eq!(view.mode(), ViewMode::Browse);
    }

    #[test]
    fn clearing_query_returns_to_uploaded_view_when_upload_exists() {
        let mut view = ViewState::new();
        view.upload_succeeded(2, BTreeSet::new());
        view.set_query("alpha");
        assert_eq!(view.mode(), ViewMode::Search);

        view.set_query("");
        assert_eq!(view.mode(), ViewMode::UploadedView);
    }

    #[test]
    fn clearing_query_returns_to_browse_without_upload() {
        let mut view = ViewState::new();
        view.set_query("alpha");
        view.set_query("");
        assert_eq!(view.mode(), ViewMode::Browse);
    }

    #[test]
    fn upload_success_resets_cursor_and_clears_query() {
        let mut view = ViewState::new();
        view.set_total_pages(9);
        view.set_page(5);
        view.set_query("alpha");

        view.upload_succeeded(3, BTreeSet::from(["ICICI".to_string()]));
        assert_eq!(view.mode(), ViewMode::UploadedView);
        assert_eq!(view.page(), 1);
        assert_eq!(view.total_pages(), 3);
        assert!(view.query().is_empty());
        assert!(view.excluded_conference_names().contains("ICICI"));
    }

    #[test]
    fn query_change_resets_page() {
        let mut view = ViewState::new();
        view.set_total_pages(5);
        view.set_page(4);
        view.set_query("beta");
        assert_eq!(view.page(), 1);
    }

    #[test]
    fn page_is_clamped() {
        let mut view = ViewState::new();
        view.set_total_pages(3);
        view.set_page(0);
        assert_eq!(view.page(), 1);
        view.set_page(7);
        assert_eq!(view.page(), 3);
    }

    #[test]
    fn reset_clears_everything_atomically() {
        let mut view = ViewState::new();
        view.upload_succeeded(6, BTreeSet::from(["ICML".to_string()]));
        view.set_page(4);

        view.reset();
        assert_eq!(view, ViewState::default());
        assert_eq!(view.mode(), ViewMode::Browse);
    }

    #[test]
    fn machine_is_reenterable() {
        let mut view = ViewState::new();
        for _ in 0..3 {
            view.set_query("q");
            view.upload_succeeded(2, BTreeSet::new());
            assert_eq!(view.mode(), ViewMode::UploadedView);
            view.reset();
            assert_eq!(view.mode(), ViewMode::Browse);
        }
    }
}
