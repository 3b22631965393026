//! Accumulated report collection with filter, sort and multi-select state.
//!
//! [`ReportCollectionStore`] is the single writer for the loaded list of
//! [`ReportSummary`] records and the selection over it. Pages accumulate in
//! fetch order; [`get_visible`](ReportCollectionStore::get_visible) derives
//! the filtered, sorted view on demand without touching the collection.
//!
//! Optimistic deletes hide ids through
//! [`hide_pending`](ReportCollectionStore::hide_pending). Hidden ids stay in
//! the collection until [`remove_confirmed`](ReportCollectionStore::remove_confirmed)
//! or a page-1 reload replaces the collection.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::CoreError;
use crate::filter::FilterState;
use crate::report::{validate_page_number, CollectionPage, ReportStatus, ReportSummary, FIRST_PAGE};
use crate::sort::{sort_reports, SortKey};
use crate::types::ReportId;

/// Per-status totals over the loaded collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub draft: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub unknown: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.draft + self.in_progress + self.completed + self.unknown
    }
}

/// In-memory report list state.
#[derive(Debug, Default)]
pub struct ReportCollectionStore {
    items: Vec<ReportSummary>,
    filter: FilterState,
    sort: SortKey,
    selection: HashSet<ReportId>,
    pending_removal: HashSet<ReportId>,
    selection_mode: bool,
    pages_loaded: u32,
    total_count: u64,
    has_more: bool,
}

impl ReportCollectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Pages ----------------------------------------------------------------

    /// Accumulate a fetched page.
    ///
    /// Page 1 replaces the collection and clears any provisional removals;
    /// later pages append in fetch order. No de-duplication is performed, so
    /// callers must not request an already-loaded page twice. Selected ids
    /// that are no longer present are pruned.
    pub fn append_page(&mut self, page: CollectionPage) -> Result<(), CoreError> {
        validate_page_number(page.page_number)?;

        if page.page_number == FIRST_PAGE {
            self.items = page.items;
            self.pending_removal.clear();
            self.pages_loaded = FIRST_PAGE;
        } else {
            self.items.extend(page.items);
            self.pages_loaded = self.pages_loaded.max(page.page_number);
        }
        self.total_count = page.total_count;
        self.has_more = page.has_more;
        self.prune_selection();
        Ok(())
    }

    /// Page number to request for the next "load more".
    pub fn next_page_number(&self) -> u32 {
        self.pages_loaded + 1
    }

    pub fn pages_loaded(&self) -> u32 {
        self.pages_loaded
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Total reports reported by the store on the last fetched page.
    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    // -- Filter / sort --------------------------------------------------------

    pub fn set_filter(&mut self, filter: FilterState) {
        self.filter = filter;
    }

    pub fn set_sort(&mut self, key: SortKey) {
        self.sort = key;
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn sort(&self) -> SortKey {
        self.sort
    }

    /// The filtered, sorted view for rendering.
    ///
    /// Provisionally removed ids are excluded. Equal sort keys keep their
    /// accumulation order.
    pub fn get_visible(&self) -> Vec<&ReportSummary> {
        let mut visible: Vec<&ReportSummary> = self
            .live_items()
            .filter(|r| self.filter.matches(r))
            .collect();
        sort_reports(&mut visible, self.sort);
        visible
    }

    /// Ids of [`get_visible`](Self::get_visible), in display order.
    pub fn visible_ids(&self) -> Vec<ReportId> {
        self.get_visible().into_iter().map(|r| r.id.clone()).collect()
    }

    // -- Selection ------------------------------------------------------------

    /// Toggle one id. Ids not present in the collection are ignored.
    ///
    /// Returns whether the id is selected afterwards.
    pub fn toggle_select(&mut self, id: &str) -> bool {
        if !self.contains(id) {
            return false;
        }
        if !self.selection.remove(id) {
            self.selection.insert(id.to_string());
            return true;
        }
        false
    }

    /// Add every given id that is present in the collection.
    pub fn select_all<I, S>(&mut self, visible_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for id in visible_ids {
            let id = id.as_ref();
            if self.contains(id) {
                self.selection.insert(id.to_string());
            }
        }
    }

    /// Select everything in the current visible view.
    pub fn select_all_visible(&mut self) {
        let ids = self.visible_ids();
        self.select_all(ids);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.contains(id)
    }

    pub fn selection_len(&self) -> usize {
        self.selection.len()
    }

    /// Selected ids in accumulation order.
    pub fn selected_ids(&self) -> Vec<ReportId> {
        self.items
            .iter()
            .filter(|r| self.selection.contains(&r.id))
            .map(|r| r.id.clone())
            .collect()
    }

    pub fn enter_selection_mode(&mut self) {
        self.selection_mode = true;
    }

    /// Leave selection mode. The selection is cleared.
    pub fn exit_selection_mode(&mut self) {
        self.selection_mode = false;
        self.selection.clear();
    }

    pub fn is_selection_mode(&self) -> bool {
        self.selection_mode
    }

    // -- Removal --------------------------------------------------------------

    /// Hide ids from the visible view ahead of a remote delete.
    ///
    /// The ids are also dropped from the selection.
    pub fn hide_pending(&mut self, ids: &[ReportId]) {
        for id in ids {
            self.selection.remove(id);
            self.pending_removal.insert(id.clone());
        }
    }

    /// Make ids visible again after their delete was not confirmed.
    pub fn unhide(&mut self, ids: &[ReportId]) {
        for id in ids {
            self.pending_removal.remove(id);
        }
    }

    pub fn is_pending_removal(&self, id: &str) -> bool {
        self.pending_removal.contains(id)
    }

    /// Remove items whose deletion the store confirmed, pruning them from
    /// the selection.
    pub fn remove_confirmed(&mut self, ids: &[ReportId]) {
        let removed: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let before = self.items.len();
        self.items.retain(|r| !removed.contains(r.id.as_str()));
        let dropped = (before - self.items.len()) as u64;
        self.total_count = self.total_count.saturating_sub(dropped);

        for id in ids {
            self.pending_removal.remove(id);
            self.selection.remove(id);
        }
    }

    // -- Queries --------------------------------------------------------------

    /// Whether `id` is loaded and not provisionally removed.
    pub fn contains(&self, id: &str) -> bool {
        !self.pending_removal.contains(id) && self.items.iter().any(|r| r.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&ReportSummary> {
        self.live_items().find(|r| r.id == id)
    }

    /// All loaded items in accumulation order, including hidden ones.
    pub fn items(&self) -> &[ReportSummary] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.live_items().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Per-status counts over the live collection, ignoring filters.
    pub fn status_counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for report in self.live_items() {
            match report.status {
                ReportStatus::Draft => counts.draft += 1,
                ReportStatus::InProgress => counts.in_progress += 1,
                ReportStatus::Completed => counts.completed += 1,
                ReportStatus::Unknown => counts.unknown += 1,
            }
        }
        counts
    }

    fn live_items(&self) -> impl Iterator<Item = &ReportSummary> {
        self.items
            .iter()
            .filter(|r| !self.pending_removal.contains(&r.id))
    }

    fn prune_selection(&mut self) {
        let present: HashSet<&str> = self
            .items
            .iter()
            .filter(|r| !self.pending_removal.contains(&r.id))
            .map(|r| r.id.as_str())
            .collect();
        self.selection.retain(|id| present.contains(id.as_str()));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
