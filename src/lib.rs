//! # places-export
//!
//! Export a saved Google Maps list (place names, links and coordinates) by driving a
//! Chrome tab over the Chrome DevTools Protocol (CDP).
//!
//! ## Features
//!
//! - **Saved-list extraction**: scrolls the virtualized list panel, walks every item and
//!   filters out interface noise
//! - **Coordinate resolution**: reads coordinates from embedded metadata and links, and
//!   falls back to opening the place and reading the deep link it navigates to
//! - **Navigation recovery**: returns to the list after a place view was opened
//! - **MCP Server**: exposes the export to AI agents over the Model Context Protocol
//!
//! ## Command line
//!
//! ```bash
//! # Export a list with a signed-in profile and write places-export.json
//! cargo run --bin places-export -- --user-data-dir ~/.config/chrome-maps --url "https://www.google.com/maps/..."
//!
//! # Serve the export over MCP (stdio)
//! cargo run --features mcp-server --bin mcp-server -- --headed
//! ```
//!
//! ## Library Usage
//!
//! ```rust,no_run
//! use places_export::{BrowserSession, ExportOptions, ExportSnapshot, LaunchOptions, SnapshotStore};
//!
//! # fn main() -> places_export::Result<()> {
//! let session = BrowserSession::launch(LaunchOptions::new().headless(false))?;
//! let options = ExportOptions::default().search_suffix(" Austria");
//!
//! let extraction = session.export(Some("https://www.google.com/maps/@48.2,16.37,12z/data=!4m2!11m1!2s..."), &options)?;
//! println!("{} place(s) in {}", extraction.records.len(), extraction.list_title);
//!
//! SnapshotStore::new("places.json").save(&ExportSnapshot::from(extraction))?;
//! # Ok(())
//! # }
//! ```
//!
//! The extraction core only needs the [`Document`] capability, so it runs against any
//! page backend:
//!
//! ```rust,no_run
//! use places_export::{BrowserSession, ExportOptions, Extractor};
//!
//! # fn main() -> places_export::Result<()> {
//! # let session = BrowserSession::new()?;
//! let document = session.document()?;
//! let options = ExportOptions::default();
//! let extraction = Extractor::new(&document, &options).run();
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`browser`]: Browser session management and the Chrome page backend
//! - [`dom`]: The structural page interface and selector strategies
//! - [`extract`]: Scrolling, discovery, labelling, coordinate resolution and recovery
//! - [`store`]: The exported snapshot on disk
//! - [`wait`]: Bounded polling
//! - [`error`]: Error types and result aliases
//! - [`mcp`]: Model Context Protocol server (requires `mcp-handler` feature)

pub mod browser;
pub mod dom;
pub mod error;
pub mod extract;
pub mod store;
pub mod wait;

#[cfg(feature = "mcp-handler")]
pub mod mcp;

pub use browser::{BrowserSession, ChromeDocument, ConnectionOptions, LaunchOptions};
pub use dom::{Document, SelectorTable};
pub use error::{ExportError, Result};
pub use extract::{ExportOptions, Extraction, Extractor, PlaceRecord, Termination};
pub use store::{ExportSnapshot, SnapshotStore};

#[cfg(feature = "mcp-handler")]
pub use mcp::PlacesServer;
#[cfg(feature = "mcp-handler")]
pub use rmcp::ServiceExt;
