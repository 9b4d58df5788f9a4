use crate::dom::SelectorTable;
use crate::error::{ExportError, Result};
use crate::wait::Poll;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Budgets, intervals and selectors for one export run.
///
/// Deserializes from JSON with every field optional; durations are given in
/// milliseconds (`scroll_settle_ms`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Scroll attempts before giving up on a feed that keeps growing
    pub max_scroll_attempts: u32,

    /// Wait after each scroll; must exceed the list's lazy-render latency
    #[serde(rename = "scroll_settle_ms", with = "millis")]
    pub scroll_settle: Duration,

    /// Interval between location checks after clicking an item
    #[serde(rename = "location_poll_ms", with = "millis")]
    pub location_poll: Duration,

    pub max_location_polls: u32,

    /// Wait after each "navigate back" issued by the recovery supervisor
    #[serde(rename = "back_settle_ms", with = "millis")]
    pub back_settle: Duration,

    pub max_back_attempts: u32,

    /// Wait after each back command of the supplementary recovery
    #[serde(rename = "recovery_settle_ms", with = "millis")]
    pub recovery_settle: Duration,

    pub max_recovery_attempts: u32,

    /// Hard bound on list positions scanned per run
    pub safety_cap: usize,

    /// Courtesy delay between items
    #[serde(rename = "item_delay_ms", with = "millis")]
    pub item_delay: Duration,

    /// Appended to the place name in fallback search links (e.g. a region)
    pub search_suffix: Option<String>,

    pub selectors: SelectorTable,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            max_scroll_attempts: 20,
            scroll_settle: Duration::from_millis(1500),
            location_poll: Duration::from_millis(200),
            max_location_polls: 20,
            back_settle: Duration::from_millis(1200),
            max_back_attempts: 5,
            recovery_settle: Duration::from_millis(1500),
            max_recovery_attempts: 3,
            safety_cap: 50,
            item_delay: Duration::from_millis(300),
            search_suffix: None,
            selectors: SelectorTable::google_maps(),
        }
    }
}

impl ExportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from a JSON file and validate them
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let options: Self = serde_json::from_str(&raw)
            .map_err(|e| ExportError::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        options.validate()?;
        Ok(options)
    }

    /// Reject budgets that would make a run do nothing
    pub fn validate(&self) -> Result<()> {
        let budgets = [
            ("max_scroll_attempts", self.max_scroll_attempts as usize),
            ("max_location_polls", self.max_location_polls as usize),
            ("max_back_attempts", self.max_back_attempts as usize),
            ("max_recovery_attempts", self.max_recovery_attempts as usize),
            ("safety_cap", self.safety_cap),
        ];
        match budgets.iter().find(|(_, value)| *value == 0) {
            Some((name, _)) => Err(ExportError::InvalidConfig(format!("{} must be greater than zero", name))),
            None => Ok(()),
        }
    }

    /// Builder method: set the safety cap
    pub fn safety_cap(mut self, cap: usize) -> Self {
        self.safety_cap = cap;
        self
    }

    /// Builder method: set the fallback search suffix
    pub fn search_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.search_suffix = Some(suffix.into());
        self
    }

    /// Builder method: set the selector table
    pub fn selectors(mut self, selectors: SelectorTable) -> Self {
        self.selectors = selectors;
        self
    }

    /// Builder method: set the scroll budget
    pub fn max_scroll_attempts(mut self, attempts: u32) -> Self {
        self.max_scroll_attempts = attempts;
        self
    }

    /// Builder method: set the back-navigation budget of the recovery supervisor
    pub fn max_back_attempts(mut self, attempts: u32) -> Self {
        self.max_back_attempts = attempts;
        self
    }

    pub(crate) fn scroll_poll(&self) -> Poll {
        Poll::new(self.scroll_settle, self.max_scroll_attempts)
    }

    pub(crate) fn location_poll(&self) -> Poll {
        Poll::new(self.location_poll, self.max_location_polls)
    }

    pub(crate) fn back_poll(&self) -> Poll {
        Poll::new(self.back_settle, self.max_back_attempts)
    }

    pub(crate) fn recovery_poll(&self) -> Poll {
        Poll::new(self.recovery_settle, self.max_recovery_attempts)
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}
