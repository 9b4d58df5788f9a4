use crate::dom::{Document, Role, SelectorTable, found};
use crate::extract::coords::{self, Coordinates, LinkConvention};
use crate::extract::discover::PlaceCandidate;
use crate::extract::options::ExportOptions;
use crate::extract::recovery::{Recovery, RecoveryState, Supervisor};
use crate::extract::session::NavigationRecoveryState;
use serde::Serialize;

/// Coordinate resolution strategies, in the order they are tried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Base64 payload in the item's `jslog` attribute
    Metadata,
    /// Address of an anchor attached to the item
    Link,
    /// Click the item and read the address it navigates to
    Navigation,
}

/// What a navigate-and-observe attempt did
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Navigation {
    /// Address the page moved to after the click
    pub location: String,
    pub recovery: Recovery,
}

/// Result of resolving one place. Never an error: a failed resolution has no coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub coordinates: Option<Coordinates>,
    /// Strategy that produced the coordinates
    pub source: Option<StrategyKind>,
    /// Address convention matched, for link and navigation results
    pub convention: Option<LinkConvention>,
    /// Strategies tried, in order
    pub attempted: Vec<StrategyKind>,
    pub navigation: Option<Navigation>,
}

impl Resolution {
    fn unresolved() -> Self {
        Self { coordinates: None, source: None, convention: None, attempted: Vec::new(), navigation: None }
    }

    fn resolved_by(&mut self, kind: StrategyKind, coordinates: Coordinates, convention: Option<LinkConvention>) {
        self.coordinates = Some(coordinates);
        self.source = Some(kind);
        self.convention = convention;
    }

    /// The detail navigation could not be undone
    pub fn is_lost(&self) -> bool {
        self.navigation.as_ref().is_some_and(|nav| nav.recovery.state == RecoveryState::Lost)
    }
}

/// Recovers coordinates for a candidate, cheapest strategy first
pub struct Resolver<'a> {
    table: &'a SelectorTable,
    options: &'a ExportOptions,
}

impl<'a> Resolver<'a> {
    pub fn new(table: &'a SelectorTable, options: &'a ExportOptions) -> Self {
        Self { table, options }
    }

    /// Try metadata, then the attached link, then navigation; stop at the first hit.
    /// `candidate` must have been inspected.
    pub fn resolve<D: Document + ?Sized>(
        &self,
        doc: &D,
        candidate: &PlaceCandidate<D::Node>,
        label: &str,
    ) -> Resolution {
        let mut resolution = Resolution::unresolved();

        resolution.attempted.push(StrategyKind::Metadata);
        if let Some(hit) = candidate.metadata.as_deref().and_then(coords::from_metadata) {
            log::info!("Found coordinates in jslog for {}: {}, {}", label, hit.latitude, hit.longitude);
            resolution.resolved_by(StrategyKind::Metadata, hit, None);
            return resolution;
        }

        resolution.attempted.push(StrategyKind::Link);
        if let Some((hit, convention)) = candidate.link.as_deref().and_then(coords::from_link) {
            log::info!("Found coordinates in URL for {}: {}, {}", label, hit.latitude, hit.longitude);
            resolution.resolved_by(StrategyKind::Link, hit, Some(convention));
            return resolution;
        }

        resolution.attempted.push(StrategyKind::Navigation);
        let Some(navigation) = self.navigate_and_observe(doc, &candidate.handle, label) else {
            log::info!("No coordinates found for {}", label);
            return resolution;
        };
        if let Some((hit, convention)) = coords::from_link(&navigation.location) {
            log::info!("Found coordinates from URL for {}: {}, {}", label, hit.latitude, hit.longitude);
            resolution.resolved_by(StrategyKind::Navigation, hit, Some(convention));
        }
        resolution.navigation = Some(navigation);
        resolution
    }

    /// Click the item, wait for the address to change, then hand off to the supervisor.
    /// `None` when the click had no visible effect.
    fn navigate_and_observe<D: Document + ?Sized>(&self, doc: &D, item: &D::Node, label: &str) -> Option<Navigation> {
        let snapshot = NavigationRecoveryState::capture(doc, self.table);
        let before = snapshot.snapshot().location.clone();

        let target = self
            .table
            .locate_first(doc, Some(item), Role::ActionTarget, |_| true)
            .map(|located| located.node)
            .unwrap_or_else(|| item.clone());

        log::info!("Clicking {} to get coordinates...", label);
        if let Err(e) = doc.click(&target) {
            log::warn!("Failed to click {}: {}", label, e);
            return None;
        }

        let outcome = self
            .options
            .location_poll()
            .until(doc, |_| found(doc.location(), "read location").filter(|location| *location != before));
        let Some(location) = outcome.into_value() else {
            log::warn!("URL did not change after clicking {}", label);
            return None;
        };
        log::debug!("URL changed for {}: {}", label, location);

        let recovery = Supervisor::new(self.table, self.options).recover(doc, &snapshot);
        Some(Navigation { location, recovery })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::fake::{BackBehavior, FakeElement, FakePage, LIST_TITLE, place_card};
    use crate::extract::discover::Discoverer;
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use std::time::Duration;

    const PLACE_URL: &str = "https://www.google.com/maps/place/Prater/@48.2,16.3,15z/data=!3d48.2167!4d16.3958";

    fn resolve_first(page: &FakePage, options: &ExportOptions) -> Resolution {
        let table = SelectorTable::default();
        let discoverer = Discoverer::new(&table);
        let mut candidate = discoverer.current_items(page).remove(0);
        discoverer.inspect(page, &mut candidate);
        Resolver::new(&table, options).resolve(page, &candidate, "test place")
    }

    fn metadata_card(name: &str, payload: &str) -> FakeElement {
        let jslog = format!("95391; track:click; metadata:[\"{}\"]", STANDARD.encode(payload));
        place_card(name).with_child(FakeElement::new("div").with_attribute("jslog", jslog))
    }

    #[test]
    fn test_metadata_short_circuits() {
        let card = metadata_card("Stephansdom", "\u{12}place:48.2085,16.3731\u{1a}")
            .with_child(FakeElement::new("a").with_attribute("href", "/maps/@1.5,2.5,15z"))
            .navigates_to(PLACE_URL);
        let page = FakePage::with_cards(vec![card]);

        let resolution = resolve_first(&page, &ExportOptions::default());

        assert_eq!(resolution.coordinates, Coordinates::new(48.2085, 16.3731));
        assert_eq!(resolution.source, Some(StrategyKind::Metadata));
        assert_eq!(resolution.attempted, [StrategyKind::Metadata]);
        assert!(page.clicks().is_empty());
    }

    #[test]
    fn test_link_resolves_without_navigation() {
        let card = place_card("Empire State Building")
            .with_child(FakeElement::new("a").with_attribute("href", "https://www.google.com/maps/@40.7128,-74.0060,17z"))
            .navigates_to(PLACE_URL);
        let page = FakePage::with_cards(vec![card]);

        let resolution = resolve_first(&page, &ExportOptions::default());

        assert_eq!(resolution.coordinates, Coordinates::new(40.7128, -74.0060));
        assert_eq!(resolution.source, Some(StrategyKind::Link));
        assert_eq!(resolution.convention, Some(LinkConvention::Viewport));
        assert_eq!(resolution.attempted, [StrategyKind::Metadata, StrategyKind::Link]);
        assert!(page.clicks().is_empty());
        assert_eq!(page.back_calls(), 0);
    }

    #[test]
    fn test_navigation_reads_new_address_and_recovers() {
        let page = FakePage::with_cards(vec![place_card("Prater").navigates_to(PLACE_URL)]);

        let resolution = resolve_first(&page, &ExportOptions::default());

        assert_eq!(resolution.coordinates, Coordinates::new(48.2167, 16.3958));
        assert_eq!(resolution.source, Some(StrategyKind::Navigation));
        assert_eq!(resolution.convention, Some(LinkConvention::PlaceData));
        assert_eq!(resolution.attempted, [StrategyKind::Metadata, StrategyKind::Link, StrategyKind::Navigation]);

        let navigation = resolution.navigation.as_ref().unwrap();
        assert_eq!(navigation.location, PLACE_URL);
        assert!(navigation.recovery.is_recovered());
        assert!(!resolution.is_lost());
        assert_eq!(page.clicks(), ["Prater"]);
        assert_eq!(page.back_calls(), 1);
    }

    #[test]
    fn test_unchanged_address_gives_no_coordinates_and_no_recovery() {
        let page = FakePage::with_cards(vec![place_card("Quiet Corner")]);

        let resolution = resolve_first(&page, &ExportOptions::default());

        assert_eq!(resolution.coordinates, None);
        assert_eq!(resolution.source, None);
        assert_eq!(resolution.navigation, None);
        assert_eq!(page.clicks(), ["Quiet Corner"]);
        assert_eq!(page.back_calls(), 0);
        assert_eq!(page.elapsed(), Duration::from_millis(4000));
    }

    #[test]
    fn test_navigation_without_coordinates_still_recovers() {
        let card = place_card("Hidden Gem").navigates_to("https://www.google.com/maps/place/Hidden+Gem");
        let page = FakePage::with_cards(vec![card]);

        let resolution = resolve_first(&page, &ExportOptions::default());

        assert_eq!(resolution.coordinates, None);
        assert!(resolution.navigation.unwrap().recovery.is_recovered());
    }

    #[test]
    fn test_lost_recovery_is_reported() {
        let page = FakePage::builder()
            .list_view(LIST_TITLE, vec![place_card("Prater").navigates_to(PLACE_URL)])
            .back(BackBehavior::Never)
            .build();

        let resolution = resolve_first(&page, &ExportOptions::default().max_back_attempts(2));

        assert!(resolution.coordinates.is_some());
        assert!(resolution.is_lost());
        assert_eq!(page.back_calls(), 2);
    }
}
