use crate::dom::{Document, Role, SelectorTable, found};
use serde::Serialize;

pub const DEFAULT_LIST_TITLE: &str = "Saved Places";

/// Comparable token for "the saved list is what the page shows"
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListIdentity {
    pub location: String,
    pub title: Option<String>,
}

impl ListIdentity {
    /// Read the current address and list title
    pub fn capture<D: Document + ?Sized>(doc: &D, table: &SelectorTable) -> Self {
        let location = found(doc.location(), "read location").unwrap_or_default();
        let title = table
            .locate_first(doc, None, Role::ListTitle, |node| {
                found(doc.text(node), "read title").is_some_and(|text| !text.is_empty())
            })
            .and_then(|located| found(doc.text(&located.node), "read title"));

        Self { location, title }
    }

    /// Whether `current` still shows this list. Compares titles by containment, or
    /// addresses when the list had no recognizable title.
    pub fn shows_same_list(&self, current: &ListIdentity) -> bool {
        match &self.title {
            Some(title) => current.title.as_deref().is_some_and(|t| t.contains(title.as_str())),
            None => current.location == self.location,
        }
    }

    /// Whether `current` is exactly this view again: same address, same list
    pub fn is_restored_by(&self, current: &ListIdentity) -> bool {
        current.location == self.location && self.shows_same_list(current)
    }
}

/// Run-wide state of one export
#[derive(Debug, Clone)]
pub struct ExtractionSession {
    origin: ListIdentity,
    processed: usize,
    safety_cap: usize,
    aborted: bool,
}

impl ExtractionSession {
    /// Snapshot the list view the run starts from
    pub fn begin<D: Document + ?Sized>(doc: &D, table: &SelectorTable, safety_cap: usize) -> Self {
        let origin = ListIdentity::capture(doc, table);
        log::info!(
            "Export session on \"{}\" ({})",
            origin.title.as_deref().unwrap_or(DEFAULT_LIST_TITLE),
            origin.location
        );
        Self { origin, processed: 0, safety_cap, aborted: false }
    }

    pub fn list_title(&self) -> &str {
        self.origin.title.as_deref().unwrap_or(DEFAULT_LIST_TITLE)
    }

    /// List positions scanned so far
    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn safety_cap(&self) -> usize {
        self.safety_cap
    }

    pub fn cap_reached(&self) -> bool {
        self.processed >= self.safety_cap
    }

    pub(crate) fn advance(&mut self) {
        self.processed += 1;
    }

    pub(crate) fn abort(&mut self) {
        self.aborted = true;
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Independent check that the page still shows the original list
    pub fn is_on_list<D: Document + ?Sized>(&self, doc: &D, table: &SelectorTable) -> bool {
        self.origin.shows_same_list(&ListIdentity::capture(doc, table))
    }
}

/// Pre-navigation snapshot taken before a navigate-and-observe attempt
#[derive(Debug, Clone)]
pub struct NavigationRecoveryState {
    snapshot: ListIdentity,
}

impl NavigationRecoveryState {
    pub fn capture<D: Document + ?Sized>(doc: &D, table: &SelectorTable) -> Self {
        Self { snapshot: ListIdentity::capture(doc, table) }
    }

    pub fn snapshot(&self) -> &ListIdentity {
        &self.snapshot
    }

    /// Whether the page is back on the snapshotted view
    pub fn is_restored<D: Document + ?Sized>(&self, doc: &D, table: &SelectorTable) -> bool {
        self.snapshot.is_restored_by(&ListIdentity::capture(doc, table))
    }
}
