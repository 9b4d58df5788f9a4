use crate::dom::{Document, SelectorTable};
use crate::extract::options::ExportOptions;
use crate::extract::session::{ExtractionSession, NavigationRecoveryState};
use serde::Serialize;
use std::cell::Cell;

/// Where a return-to-list attempt stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryState {
    /// Off the list view after a detail navigation
    Departed,
    /// A back command was issued and the page is being compared with the snapshot
    Verifying,
    Recovered,
    /// Back budget spent without reaching the list view
    Lost,
}

/// Outcome of [`Supervisor::recover`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Recovery {
    pub state: RecoveryState,
    /// Back commands issued
    pub attempts: u32,
}

impl Recovery {
    pub fn is_recovered(&self) -> bool {
        self.state == RecoveryState::Recovered
    }
}

/// Brings the page back to the saved list after a navigation side effect
pub struct Supervisor<'a> {
    table: &'a SelectorTable,
    options: &'a ExportOptions,
}

impl<'a> Supervisor<'a> {
    pub fn new(table: &'a SelectorTable, options: &'a ExportOptions) -> Self {
        Self { table, options }
    }

    /// Navigate back until the page matches the pre-navigation snapshot
    pub fn recover<D: Document + ?Sized>(&self, doc: &D, snapshot: &NavigationRecoveryState) -> Recovery {
        let state = Cell::new(RecoveryState::Departed);
        let enter = |next: RecoveryState| {
            log::debug!("recovery: {:?} -> {:?}", state.get(), next);
            state.set(next);
        };

        let outcome = self.options.back_poll().drive(
            doc,
            |attempt| {
                if let Err(e) = doc.go_back() {
                    log::debug!("back command {} failed: {}", attempt, e);
                }
            },
            |attempt| {
                enter(RecoveryState::Verifying);
                if snapshot.is_restored(doc, self.table) {
                    log::info!("Returned to list after {} back attempts", attempt);
                    return Some(());
                }
                enter(RecoveryState::Departed);
                None
            },
        );

        let attempts = outcome.attempts();
        if outcome.is_ready() {
            enter(RecoveryState::Recovered);
        } else {
            log::warn!("Could not navigate back to the list after {} attempts", attempts);
            enter(RecoveryState::Lost);
        }

        Recovery { state: state.get(), attempts }
    }

    /// Supplementary recovery used by the extraction loop when the list view is gone.
    /// Returns whether the original list is showing again.
    pub fn reestablish<D: Document + ?Sized>(&self, doc: &D, session: &ExtractionSession) -> bool {
        if session.is_on_list(doc, self.table) {
            return true;
        }

        let outcome = self.options.recovery_poll().drive(
            doc,
            |attempt| {
                if let Err(e) = doc.go_back() {
                    log::debug!("recovery back command {} failed: {}", attempt, e);
                }
            },
            |_| session.is_on_list(doc, self.table).then_some(()),
        );

        if outcome.is_ready() {
            log::info!("Recovered saved list page after {} attempts", outcome.attempts());
            return true;
        }
        log::error!("Could not recover saved list page \"{}\"", session.list_title());
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Role;
    use crate::dom::fake::{BackBehavior, FakePage, LIST_TITLE, LIST_URL, place_card, selector};
    use std::time::Duration;

    const PLACE_URL: &str = "https://www.google.com/maps/place/Prater/data=!3d48.2167!4d16.3958";

    fn departed_page(back: BackBehavior) -> (FakePage, NavigationRecoveryState) {
        let page = FakePage::builder()
            .list_view(LIST_TITLE, vec![place_card("Prater").navigates_to(PLACE_URL)])
            .back(back)
            .build();
        let snapshot = NavigationRecoveryState::capture(&page, &SelectorTable::default());
        let card = page.query_first(None, &selector(Role::ListItem)).unwrap().unwrap();
        page.click(&card).unwrap();
        (page, snapshot)
    }

    #[test]
    fn test_recovers_on_third_back() {
        let (page, snapshot) = departed_page(BackBehavior::SucceedOn(3));
        let table = SelectorTable::default();
        let options = ExportOptions::default();

        let recovery = Supervisor::new(&table, &options).recover(&page, &snapshot);

        assert_eq!(recovery, Recovery { state: RecoveryState::Recovered, attempts: 3 });
        assert_eq!(page.back_calls(), 3);
        assert_eq!(page.elapsed(), Duration::from_millis(3600));
        assert_eq!(page.current_location(), LIST_URL);
    }

    #[test]
    fn test_lost_when_back_never_works() {
        let (page, snapshot) = departed_page(BackBehavior::Never);
        let table = SelectorTable::default();
        let options = ExportOptions::default();

        let recovery = Supervisor::new(&table, &options).recover(&page, &snapshot);

        assert_eq!(recovery.state, RecoveryState::Lost);
        assert_eq!(recovery.attempts, 5);
        assert!(!recovery.is_recovered());
    }

    #[test]
    fn test_reestablish_is_free_when_on_list() {
        let page = FakePage::with_cards(vec![place_card("Prater")]);
        let table = SelectorTable::default();
        let options = ExportOptions::default();
        let session = ExtractionSession::begin(&page, &table, 10);

        assert!(Supervisor::new(&table, &options).reestablish(&page, &session));
        assert_eq!(page.back_calls(), 0);
    }

    #[test]
    fn test_reestablish_uses_its_own_budget() {
        let (page, _) = departed_page(BackBehavior::SucceedOn(2));
        let table = SelectorTable::default();
        let options = ExportOptions::default();
        let session = ExtractionSession::begin(&FakePage::with_cards(Vec::new()), &table, 10);

        assert!(Supervisor::new(&table, &options).reestablish(&page, &session));
        assert_eq!(page.back_calls(), 2);
        assert_eq!(page.elapsed(), Duration::from_millis(3000));
    }

    #[test]
    fn test_reestablish_gives_up() {
        let (page, _) = departed_page(BackBehavior::Never);
        let table = SelectorTable::default();
        let options = ExportOptions::default();
        let session = ExtractionSession::begin(&FakePage::with_cards(Vec::new()), &table, 10);

        assert!(!Supervisor::new(&table, &options).reestablish(&page, &session));
        assert_eq!(page.back_calls(), 3);
    }
}
