//! Structural access to the rendered saved-list page
//!
//! The extraction core never talks to a browser directly. It works against the
//! [`Document`] capability, which exposes just enough of a live page to locate
//! elements by selector, read their text and attributes, and drive the few
//! commands the export needs (scroll, click, navigate back).
//!
//! - [`Document`]: the structural query interface
//! - [`SelectorTable`]: ordered selector strategies per [`Role`]
//! - [`ScrollMetrics`]: scroll extent of a container

pub mod selectors;

#[cfg(test)]
pub(crate) mod fake;

pub use selectors::{Located, LocatedAll, Role, SelectorTable, Strategy};

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Scroll extent of an element, in CSS pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrollMetrics {
    /// Total content height (`scrollHeight`)
    pub scroll_height: f64,

    /// Visible height (`clientHeight`)
    pub client_height: f64,
}

impl ScrollMetrics {
    pub fn new(scroll_height: f64, client_height: f64) -> Self {
        Self { scroll_height, client_height }
    }

    /// Whether the content is taller than the visible area
    pub fn overflows(&self) -> bool {
        self.scroll_height > self.client_height
    }
}

/// Read/query-and-command interface to a rendered page.
///
/// No operation is assumed to be total: a query may find nothing, a node handle
/// may have gone stale since it was obtained, and a command may have no visible
/// effect. Implementations report transport failures as errors; the extraction
/// core treats every error as "not found".
pub trait Document {
    /// Opaque handle to one element. Handles are only valid until the page re-renders.
    type Node: Clone + fmt::Debug;

    /// All elements matching `selector`, in document order. With a scope, only
    /// descendants of the scope element are considered.
    fn query_all(&self, scope: Option<&Self::Node>, selector: &str) -> Result<Vec<Self::Node>>;

    /// Nearest ancestor-or-self of `node` matching `selector`
    fn closest(&self, node: &Self::Node, selector: &str) -> Result<Option<Self::Node>>;

    /// Rendered text of the element, trimmed. Empty when the element has none.
    fn text(&self, node: &Self::Node) -> Result<String>;

    /// Raw attribute value
    fn attribute(&self, node: &Self::Node, name: &str) -> Result<Option<String>>;

    fn scroll_metrics(&self, node: &Self::Node) -> Result<ScrollMetrics>;

    /// Scroll the element to the end of its content
    fn scroll_to_end(&self, node: &Self::Node) -> Result<()>;

    /// Activate the element as a user click would
    fn click(&self, node: &Self::Node) -> Result<()>;

    /// Step back in session history
    fn go_back(&self) -> Result<()>;

    /// Current page address
    fn location(&self) -> Result<String>;

    /// Suspend for a settle interval
    fn wait(&self, duration: Duration);

    /// First element matching `selector`
    fn query_first(&self, scope: Option<&Self::Node>, selector: &str) -> Result<Option<Self::Node>> {
        Ok(self.query_all(scope, selector)?.into_iter().next())
    }
}

/// Collapse a page error into "nothing there", logging what was being attempted.
pub(crate) fn found<T>(result: Result<T>, what: &str) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            log::debug!("{} failed: {}", what, e);
            None
        }
    }
}
