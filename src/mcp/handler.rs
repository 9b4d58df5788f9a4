use crate::browser::BrowserSession;
use crate::extract::ExportOptions;
use crate::store::SnapshotStore;
use rmcp::{
    ServerHandler,
    handler::server::router::tool::ToolRouter,
    model::{ServerCapabilities, ServerInfo},
    tool_handler,
};
use std::sync::{Arc, Mutex};

/// MCP server exposing the saved-places export over one shared browser session.
///
/// Clones share the session, so every MCP connection drives the same browser and
/// exports are serialized behind its lock.
#[derive(Clone)]
pub struct PlacesServer {
    session: Arc<Mutex<BrowserSession>>,
    options: Arc<ExportOptions>,
    store: SnapshotStore,
    pub(crate) tool_router: ToolRouter<Self>,
}

impl PlacesServer {
    pub fn new(session: BrowserSession, options: ExportOptions, store: SnapshotStore) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            options: Arc::new(options),
            store,
            tool_router: Self::tool_router(),
        }
    }

    pub(crate) fn shared_session(&self) -> Arc<Mutex<BrowserSession>> {
        Arc::clone(&self.session)
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }
}

#[tool_handler]
impl ServerHandler for PlacesServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Exports a saved Google Maps list (names, links, coordinates) from the browser's active tab. \
                 Open the list in the browser or pass its url to places_export; the result is also stored and \
                 can be read back with places_snapshot."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
