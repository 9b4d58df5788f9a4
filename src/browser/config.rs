use std::ffi::OsStr;
use std::path::PathBuf;
use std::time::Duration;

/// Long lists take minutes to export; headless_chrome's default idle timeout is 30 seconds
const IDLE_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Options for launching a new Chrome/Chromium instance
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchOptions {
    /// Run without a visible window
    pub headless: bool,

    pub window_width: u32,

    pub window_height: u32,

    /// Chrome binary to use instead of the auto-detected one
    pub chrome_path: Option<PathBuf>,

    /// Profile directory. Reuse a signed-in profile so saved lists are visible.
    pub user_data_dir: Option<PathBuf>,

    pub sandbox: bool,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1280,
            window_height: 900,
            chrome_path: None,
            user_data_dir: None,
            sandbox: true,
        }
    }
}

impl LaunchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set headless mode
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Builder method: set window size
    pub fn window_size(mut self, width: u32, height: u32) -> Self {
        self.window_width = width;
        self.window_height = height;
        self
    }

    /// Builder method: set the Chrome binary
    pub fn chrome_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_path = Some(path.into());
        self
    }

    /// Builder method: set the profile directory
    pub fn user_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.user_data_dir = Some(dir.into());
        self
    }

    /// Builder method: set sandbox mode
    pub fn sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = sandbox;
        self
    }

    /// Launch settings for headless_chrome. Automation markers are stripped because
    /// Google Maps serves a reduced page to browsers that advertise them.
    pub(crate) fn to_chrome(&self) -> headless_chrome::LaunchOptions<'static> {
        let mut chrome = headless_chrome::LaunchOptions::default();
        chrome.ignore_default_args.push(OsStr::new("--enable-automation"));
        chrome.args.push(OsStr::new("--disable-blink-features=AutomationControlled"));
        chrome.idle_browser_timeout = IDLE_TIMEOUT;

        chrome.headless = self.headless;
        chrome.window_size = Some((self.window_width, self.window_height));
        chrome.path = self.chrome_path.clone();
        chrome.user_data_dir = self.user_data_dir.clone();
        chrome.sandbox = self.sandbox;
        chrome
    }
}

/// Options for attaching to a running browser over its DevTools WebSocket
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionOptions {
    /// e.g. `ws://127.0.0.1:9222/devtools/browser/<id>`
    pub ws_url: String,

    /// Idle timeout of the connection in milliseconds
    pub timeout: u64,
}

impl ConnectionOptions {
    pub fn new(ws_url: impl Into<String>) -> Self {
        Self { ws_url: ws_url.into(), timeout: 60 * 60 * 1000 }
    }

    /// Builder method: set the idle timeout in milliseconds
    pub fn timeout(mut self, timeout: u64) -> Self {
        self.timeout = timeout;
        self
    }
}
