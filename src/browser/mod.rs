//! Live Chrome backend
//!
//! - [`BrowserSession`]: launch or attach to Chrome and pick the active tab
//! - [`ChromeDocument`]: the [`Document`](crate::dom::Document) capability over a tab

pub mod config;
pub mod document;
pub mod session;

pub use config::{ConnectionOptions, LaunchOptions};
pub use document::{ChromeDocument, ElementId};
pub use session::BrowserSession;
