use crate::browser::config::{ConnectionOptions, LaunchOptions};
use crate::browser::document::ChromeDocument;
use crate::error::{ExportError, Result};
use crate::extract::{ExportOptions, Extraction, Extractor, is_maps_page};
use headless_chrome::{Browser, Tab};
use std::{sync::Arc, time::Duration};

/// 2 = visible and focused, 1 = visible, 0 = neither
const TAB_RANK: &str =
    "document.visibilityState === 'visible' ? (document.hasFocus() ? 2 : 1) : 0";

/// A Chrome instance the export runs in, either launched by us or attached to
pub struct BrowserSession {
    browser: Browser,
}

impl BrowserSession {
    /// Launch Chrome with one blank tab
    pub fn launch(options: LaunchOptions) -> Result<Self> {
        let browser = Browser::new(options.to_chrome()).map_err(|e| ExportError::LaunchFailed(e.to_string()))?;
        browser.new_tab().map_err(|e| ExportError::LaunchFailed(format!("Failed to create tab: {}", e)))?;

        log::info!("Launched browser (headless: {})", options.headless);
        Ok(Self { browser })
    }

    /// Attach to a running Chrome, e.g. the user's own signed-in browser started
    /// with `--remote-debugging-port`
    pub fn connect(options: ConnectionOptions) -> Result<Self> {
        let browser = Browser::connect_with_timeout(options.ws_url.clone(), Duration::from_millis(options.timeout))
            .map_err(|e| ExportError::ConnectionFailed(format!("{}: {}", options.ws_url, e)))?;

        log::info!("Connected to browser at {}", options.ws_url);
        Ok(Self { browser })
    }

    /// Launch with [`LaunchOptions::default`]
    pub fn new() -> Result<Self> {
        Self::launch(LaunchOptions::default())
    }

    fn tabs(&self) -> Result<Vec<Arc<Tab>>> {
        let tabs = self
            .browser
            .get_tabs()
            .lock()
            .map_err(|e| ExportError::TabOperationFailed(format!("Failed to get tabs: {}", e)))?
            .clone();
        Ok(tabs)
    }

    /// The tab the user is looking at.
    ///
    /// Prefers a visible, focused tab, then any visible tab. Headless tabs report
    /// themselves hidden, so a lone tab is taken as is.
    pub fn tab(&self) -> Result<Arc<Tab>> {
        let tabs = self.tabs()?;

        let ranked = tabs
            .iter()
            .filter_map(|tab| match tab.evaluate(TAB_RANK, false) {
                Ok(remote) => remote.value.and_then(|v| v.as_u64()).filter(|rank| *rank > 0).map(|rank| (rank, tab)),
                Err(e) => {
                    log::debug!("Failed to rank tab {}: {}", tab.get_url(), e);
                    None
                }
            })
            // max_by_key keeps the last maximum; reverse so the first tab wins ties
            .rev()
            .max_by_key(|(rank, _)| *rank);

        match (ranked, tabs.as_slice()) {
            (Some((_, tab)), _) => Ok(tab.clone()),
            (None, [only]) => Ok(only.clone()),
            (None, _) => Err(ExportError::TabOperationFailed(format!("No active tab among {} tab(s)", tabs.len()))),
        }
    }

    /// Load `url` in the active tab and wait for the navigation to settle
    pub fn navigate(&self, url: &str) -> Result<()> {
        let tab = self.tab()?;
        tab.navigate_to(url)
            .map_err(|e| ExportError::NavigationFailed(format!("Failed to navigate to {}: {}", url, e)))?;
        tab.wait_until_navigated()
            .map_err(|e| ExportError::NavigationFailed(format!("Navigation timeout: {}", e)))?;

        log::debug!("Navigated to {}", url);
        Ok(())
    }

    pub fn current_url(&self) -> Result<String> {
        Ok(self.tab()?.get_url())
    }

    /// Structural query interface over the active tab
    pub fn document(&self) -> Result<ChromeDocument> {
        Ok(ChromeDocument::new(self.tab()?))
    }

    /// Export the saved list shown in the active tab, navigating to `url` first when given.
    /// Fails with [`ExportError::NotAMapsPage`] when the tab is not on Google Maps.
    pub fn export(&self, url: Option<&str>, options: &ExportOptions) -> Result<Extraction> {
        options.validate()?;
        if let Some(url) = url {
            self.navigate(url)?;
        }

        let current = self.current_url()?;
        if !is_maps_page(&current) {
            return Err(ExportError::NotAMapsPage(current));
        }

        let document = self.document()?;
        Ok(Extractor::new(&document, options).run())
    }
}
