use crate::dom::{Document, Role, ScrollMetrics, SelectorTable, Strategy, found};
use crate::wait::Poll;
use serde::Serialize;

/// How the scroll container was found
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ContainerSource {
    Table(Strategy),
    /// Broad scan over every element for a large overflowing one
    FallbackScan,
}

/// What the loader did
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrollReport {
    /// `None` when no container was found and nothing was scrolled
    pub container: Option<ContainerSource>,
    pub attempts: u32,
    /// Content stopped growing before the attempt budget ran out
    pub stalled: bool,
    /// The container's height could not be read, so completeness is unknown
    pub unreadable: bool,
    pub final_height: f64,
}

impl ScrollReport {
    fn skipped() -> Self {
        Self { container: None, attempts: 0, stalled: false, unreadable: false, final_height: 0.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Halt {
    Stalled,
    Unreadable,
}

/// Scrolls the virtualized side panel until every item is rendered
pub struct ScrollLoader<'a> {
    table: &'a SelectorTable,
    poll: Poll,
}

impl<'a> ScrollLoader<'a> {
    pub fn new(table: &'a SelectorTable, poll: Poll) -> Self {
        Self { table, poll }
    }

    /// Locate the scroll container, falling back to a scan for any large overflowing element
    pub fn find_container<D: Document + ?Sized>(&self, doc: &D) -> Option<(D::Node, ContainerSource)> {
        let overflows = |node: &D::Node| found(doc.scroll_metrics(node), "read scroll metrics").is_some_and(|m| m.overflows());

        if let Some(located) = self.table.locate_first(doc, None, Role::ScrollContainer, overflows) {
            log::info!("Found scrollable list using selector: {}", located.strategy.selector);
            return Some((located.node, ContainerSource::Table(located.strategy)));
        }

        let large = |m: &ScrollMetrics| m.overflows() && m.client_height > 200.0 && m.scroll_height > 300.0;
        let node = found(doc.query_all(None, "*"), "scan for scrollable elements")?
            .into_iter()
            .find(|node| found(doc.scroll_metrics(node), "read scroll metrics").is_some_and(|m| large(&m)))?;
        log::info!("Found scrollable container by fallback scan");
        Some((node, ContainerSource::FallbackScan))
    }

    /// Find the container and load everything; a no-op when there is none
    pub fn run<D: Document + ?Sized>(&self, doc: &D) -> ScrollReport {
        match self.find_container(doc) {
            Some((container, source)) => ScrollReport { container: Some(source), ..self.load_all(doc, &container) },
            None => {
                log::warn!("No scrollable list found; continuing with the items already rendered");
                ScrollReport::skipped()
            }
        }
    }

    /// Scroll to the end, settle, re-measure; stop once the content height holds still
    pub fn load_all<D: Document + ?Sized>(&self, doc: &D, container: &D::Node) -> ScrollReport {
        let height = |doc: &D| found(doc.scroll_metrics(container), "read scroll metrics").map(|m| m.scroll_height);
        let mut previous = height(doc).unwrap_or_default();
        let mut last = previous;

        let outcome = self.poll.drive(
            doc,
            |attempt| {
                if let Some(e) = doc.scroll_to_end(container).err() {
                    log::debug!("scroll attempt {} failed: {}", attempt, e);
                }
            },
            |attempt| {
                let Some(current) = height(doc) else {
                    return Some(Halt::Unreadable);
                };
                log::debug!("Scroll attempt {}, height: {}", attempt, current);
                last = current;
                if current == previous {
                    return Some(Halt::Stalled);
                }
                previous = current;
                None
            },
        );

        let attempts = outcome.attempts();
        let halt = outcome.into_value();
        match halt {
            Some(Halt::Stalled) => log::info!("No more content loaded after {} scroll attempts", attempts),
            Some(Halt::Unreadable) => {
                log::warn!("Lost track of the list height after {} scroll attempts; list may be incomplete", attempts)
            }
            None => log::warn!("Scroll budget of {} attempts spent; list may be incomplete", self.poll.max_attempts),
        }

        ScrollReport {
            container: None,
            attempts,
            stalled: halt == Some(Halt::Stalled),
            unreadable: halt == Some(Halt::Unreadable),
            final_height: last,
        }
    }
}
