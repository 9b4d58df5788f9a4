//! Saved-list export: the extraction core
//!
//! [`Extractor::run`] drives one export over any [`Document`]:
//!
//! 1. capture the list identity ([`ExtractionSession`])
//! 2. scroll the virtualized panel until every item is rendered ([`ScrollLoader`])
//! 3. walk the list position by position, re-discovering items each time
//!    ([`Discoverer`]), labelling and filtering them ([`Labeler`], [`is_noise`]),
//!    resolving coordinates ([`Resolver`]) and getting back to the list when a detail visit
//!    navigated away ([`Supervisor`])
//!
//! The run never fails. Anything the page does not offer turns into a missing
//! value, a skipped item or an early, graceful end of the run.

pub mod coords;
pub mod discover;
pub mod label;
pub mod options;
pub mod record;
pub mod recovery;
pub mod resolve;
pub mod scroll;
pub mod session;

pub use coords::{Coordinates, LinkConvention};
pub use discover::{Discoverer, PlaceCandidate};
pub use label::{Label, LabelSource, Labeler, NoiseReason, is_noise};
pub use options::ExportOptions;
pub use record::{PlaceRecord, coordinate_link, search_link};
pub use recovery::{Recovery, RecoveryState, Supervisor};
pub use resolve::{Resolution, Resolver, StrategyKind};
pub use scroll::{ScrollLoader, ScrollReport};
pub use session::{ExtractionSession, ListIdentity, NavigationRecoveryState};

use crate::dom::{Document, found};
use serde::Serialize;

/// Why a run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Every rendered item was visited
    ListExhausted,
    SafetyCap,
    /// The list view could not be restored after a navigation
    SessionLost,
}

/// Result of one export run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extraction {
    pub records: Vec<PlaceRecord>,
    pub list_title: String,
    /// List positions visited
    pub scanned: usize,
    /// Positions rejected as interface noise
    pub skipped: usize,
    pub termination: Termination,
    pub scroll: Option<ScrollReport>,
}

/// Whether `url` is a Google Maps page the export can run on
pub fn is_maps_page(url: &str) -> bool {
    url.contains("maps.google.com") || url.contains("google.com/maps") || url.contains("maps.google.")
}

/// Runs the export over a page
pub struct Extractor<'a, D: Document + ?Sized> {
    doc: &'a D,
    options: &'a ExportOptions,
}

impl<'a, D: Document + ?Sized> Extractor<'a, D> {
    pub fn new(doc: &'a D, options: &'a ExportOptions) -> Self {
        Self { doc, options }
    }

    /// Capture the list, load it completely, then extract every place
    pub fn run(&self) -> Extraction {
        let table = &self.options.selectors;
        let mut session = ExtractionSession::begin(self.doc, table, self.options.safety_cap);

        log::info!("Scrolling to load all places...");
        let report = ScrollLoader::new(table, self.options.scroll_poll()).run(self.doc);

        let extraction = self.extract(&mut session);
        Extraction { scroll: Some(report), ..extraction }
    }

    /// Walk the list until it is exhausted, the safety cap is hit or the list view is lost
    pub fn extract(&self, session: &mut ExtractionSession) -> Extraction {
        let doc = self.doc;
        let table = &self.options.selectors;
        let discoverer = Discoverer::new(table);
        let labeler = Labeler::new(table);
        let resolver = Resolver::new(table, self.options);
        let supervisor = Supervisor::new(table, self.options);

        let mut records = Vec::new();
        let mut skipped = 0;

        let termination = loop {
            if session.cap_reached() {
                log::warn!("Safety cap of {} places reached", session.safety_cap());
                break Termination::SafetyCap;
            }

            if !supervisor.reestablish(doc, session) {
                log::error!("Stopping at place {}", records.len() + 1);
                session.abort();
                break Termination::SessionLost;
            }

            let position = session.processed();
            let items = discoverer.current_items(doc);
            let total = items.len();
            let Some(mut candidate) = items.into_iter().nth(position) else {
                log::info!("All {} available places have been processed", total);
                break Termination::ListExhausted;
            };

            let label = labeler.label_of(doc, &candidate.handle, candidate.position);
            if let Some(reason) = is_noise(&label.text) {
                log::info!("Skipping \"{}\": {}", label.text, reason);
                skipped += 1;
                session.advance();
                continue;
            }

            let card = candidate.position + 1;
            log::info!("Processing place {}: {} (card {}/{})", records.len() + 1, label.text, card, total);
            discoverer.inspect(doc, &mut candidate);
            candidate.label = Some(label.text);
            let name = candidate.label.as_deref().unwrap_or_default();
            let resolution = resolver.resolve(doc, &candidate, name);

            if resolution.is_lost() {
                log::warn!("Lost saved list page after processing \"{}\"", name);
            }
            if !supervisor.reestablish(doc, session) {
                log::error!("Stopping at place {}", records.len() + 1);
                session.abort();
                break Termination::SessionLost;
            }

            let link = record_link(&candidate, &resolution, self.options.search_suffix.as_deref());
            records.push(PlaceRecord::new(name, link, resolution.coordinates));
            session.advance();
            doc.wait(self.options.item_delay);
        };

        if records.is_empty() {
            self.log_diagnostics();
        } else {
            log::info!("Exported {} place(s) from \"{}\"", records.len(), session.list_title());
        }

        Extraction {
            records,
            list_title: session.list_title().to_string(),
            scanned: session.processed(),
            skipped,
            termination,
            scroll: None,
        }
    }

    /// Summarize what the page does contain when nothing usable was found
    fn log_diagnostics(&self) {
        let buttons = found(self.doc.query_all(None, "button[jsaction]"), "count action buttons").unwrap_or_default();
        let samples: Vec<String> = found(self.doc.query_all(None, r#"span[dir="ltr"]"#), "sample labels")
            .unwrap_or_default()
            .iter()
            .take(5)
            .filter_map(|node| found(self.doc.text(node), "read sample"))
            .map(|text| text.chars().take(30).collect::<String>())
            .filter(|text| text.chars().count() > 2)
            .collect();

        log::warn!("No usable places found. The page structure might have changed.");
        log::warn!("Buttons with jsaction: {}", buttons.len());
        log::warn!("Sample place-like text: {:?}", samples);
    }
}

/// Link for a record.
///
/// With coordinates: the item's anchor, else the address a detail visit navigated to,
/// else a replay reference to the item's action handler, else a search pinned to
/// the coordinates. Without coordinates: a text search for the name.
fn record_link<N>(candidate: &PlaceCandidate<N>, resolution: &Resolution, suffix: Option<&str>) -> String {
    let Some(coordinates) = resolution.coordinates else {
        return search_link(candidate.label.as_deref().unwrap_or_default(), suffix);
    };

    let navigated = resolution
        .navigation
        .as_ref()
        .filter(|_| resolution.source == Some(StrategyKind::Navigation))
        .map(|nav| nav.location.clone());

    candidate
        .link
        .clone()
        .or(navigated)
        .or_else(|| candidate.action.as_ref().map(|action| format!("javascript:{}", action)))
        .unwrap_or_else(|| coordinate_link(coordinates))
}
