//! MCP (Model Context Protocol) server for the saved-places export
//!
//! Tools:
//! - `places_export`: run an export on the active tab and store the snapshot
//! - `places_snapshot`: read the stored snapshot
//! - `places_clear`: delete the stored snapshot

pub mod handler;
pub use handler::PlacesServer;

use crate::error::ExportError;
use crate::extract::{Extraction, PlaceRecord, Termination};
use rmcp::{
    ErrorData as McpError,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content},
    tool, tool_router,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::PoisonError;

/// Export tool parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ExportParams {
    /// Saved-list URL to open first; without it the list already open in the active tab is exported
    #[serde(default)]
    pub url: Option<String>,
    /// Maximum number of list positions to visit (default: 50)
    #[serde(default)]
    pub safety_cap: Option<usize>,
    /// Text appended to place names in fallback search links, e.g. a country
    #[serde(default)]
    pub search_suffix: Option<String>,
}

/// What `places_export` reports back
#[derive(Debug, Serialize)]
struct ExportSummary<'a> {
    list_name: &'a str,
    exported: usize,
    scanned: usize,
    skipped: usize,
    termination: Termination,
    /// Whether the run replaced the stored snapshot
    stored: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<&'static str>,
    places: &'a [PlaceRecord],
}

impl<'a> ExportSummary<'a> {
    fn new(extraction: &'a Extraction, stored: bool) -> Self {
        Self {
            list_name: &extraction.list_title,
            exported: extraction.records.len(),
            scanned: extraction.scanned,
            skipped: extraction.skipped,
            termination: extraction.termination,
            stored,
            note: (!stored).then_some("No places found; the previously stored export was left unchanged"),
            places: &extraction.records,
        }
    }
}

fn to_mcp_error(error: ExportError) -> McpError {
    match error {
        ExportError::NotAMapsPage(_) | ExportError::InvalidConfig(_) => {
            McpError::invalid_params(error.to_string(), None)
        }
        other => McpError::internal_error(other.to_string(), None),
    }
}

fn json_text<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(value).map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

#[tool_router]
impl PlacesServer {
    /// Run an export on the active tab
    #[tool(
        description = "Export every place of the Google Maps saved list open in the browser (name, link, latitude, longitude). Takes several seconds per place."
    )]
    async fn places_export(&self, Parameters(params): Parameters<ExportParams>) -> Result<CallToolResult, McpError> {
        let mut options = self.options().clone();
        if let Some(cap) = params.safety_cap {
            options = options.safety_cap(cap);
        }
        if let Some(suffix) = params.search_suffix {
            options = options.search_suffix(suffix);
        }

        let session = self.shared_session();
        let url = params.url;
        let extraction = tokio::task::spawn_blocking(move || {
            // A panic during an earlier export does not make the session unusable
            let session = session.lock().unwrap_or_else(PoisonError::into_inner);
            session.export(url.as_deref(), &options)
        })
        .await
        .map_err(|e| McpError::internal_error(format!("Export task failed: {}", e), None))?
        .map_err(to_mcp_error)?;

        let stored = self.store().save_run(extraction.clone()).map_err(to_mcp_error)?.is_some();
        json_text(&ExportSummary::new(&extraction, stored))
    }

    /// Read the stored snapshot
    #[tool(description = "Return the places stored by the last places_export run")]
    fn places_snapshot(&self) -> Result<CallToolResult, McpError> {
        match self.store().load().map_err(to_mcp_error)? {
            Some(snapshot) => json_text(&snapshot),
            None => Ok(CallToolResult::success(vec![Content::text("No export has been stored yet")])),
        }
    }

    /// Delete the stored snapshot
    #[tool(description = "Delete the places stored by the last places_export run")]
    fn places_clear(&self) -> Result<CallToolResult, McpError> {
        let message =
            if self.store().clear().map_err(to_mcp_error)? { "Stored export deleted" } else { "No export was stored" };
        Ok(CallToolResult::success(vec![Content::text(message)]))
    }
}
