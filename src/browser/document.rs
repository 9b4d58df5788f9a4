use crate::dom::{Document, ScrollMetrics};
use crate::error::{ExportError, Result};
use headless_chrome::Tab;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

/// Page-side helper installed on first use; keeps a weak registry of element ids
const BRIDGE: &str = include_str!("bridge.js");

/// Handle to an element registered with the page bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub u64);

/// Bridge reply. `err` is listed first so a reply carrying it never parses as `ok`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Reply<T> {
    Err { err: String },
    Ok { ok: T },
}

/// [`Document`] over a live Chrome tab.
///
/// Every operation is a single `Runtime.evaluate` round trip through a small
/// script installed in the page. Element handles are ids that go stale as soon
/// as the page drops the element.
#[derive(Clone)]
pub struct ChromeDocument {
    tab: Arc<Tab>,
}

impl ChromeDocument {
    pub fn new(tab: Arc<Tab>) -> Self {
        Self { tab }
    }

    pub fn tab(&self) -> &Arc<Tab> {
        &self.tab
    }

    fn call<T: DeserializeOwned>(&self, call: &str, args: serde_json::Value) -> Result<T> {
        let script = format!("{}\nwindow.__placesExport.call({}, {})", BRIDGE, serde_json::to_string(call)?, args);

        let result = self
            .tab
            .evaluate(&script, false)
            .map_err(|e| ExportError::EvaluationFailed(format!("{}: {}", call, e)))?;

        let value = result
            .value
            .ok_or_else(|| ExportError::BridgeProtocol(format!("no value returned from {}", call)))?;

        // The bridge returns a JSON string so nested values survive the protocol unchanged
        let reply: String = serde_json::from_value(value)
            .map_err(|e| ExportError::BridgeProtocol(format!("{} did not return a string: {}", call, e)))?;

        match serde_json::from_str::<Reply<T>>(&reply)
            .map_err(|e| ExportError::BridgeProtocol(format!("{} returned {}: {}", call, reply, e)))?
        {
            Reply::Ok { ok } => Ok(ok),
            Reply::Err { err } => Err(ExportError::BridgeCall { call: call.to_string(), reason: err }),
        }
    }
}

impl Document for ChromeDocument {
    type Node = ElementId;

    fn query_all(&self, scope: Option<&ElementId>, selector: &str) -> Result<Vec<ElementId>> {
        self.call("query_all", json!({ "scope": scope, "selector": selector }))
    }

    fn closest(&self, node: &ElementId, selector: &str) -> Result<Option<ElementId>> {
        self.call("closest", json!({ "node": node, "selector": selector }))
    }

    fn text(&self, node: &ElementId) -> Result<String> {
        self.call("text", json!({ "node": node }))
    }

    fn attribute(&self, node: &ElementId, name: &str) -> Result<Option<String>> {
        self.call("attribute", json!({ "node": node, "name": name }))
    }

    fn scroll_metrics(&self, node: &ElementId) -> Result<ScrollMetrics> {
        self.call("scroll_metrics", json!({ "node": node }))
    }

    fn scroll_to_end(&self, node: &ElementId) -> Result<()> {
        self.call::<bool>("scroll_to_end", json!({ "node": node })).map(drop)
    }

    fn click(&self, node: &ElementId) -> Result<()> {
        self.call::<bool>("click", json!({ "node": node })).map(drop)
    }

    fn go_back(&self) -> Result<()> {
        self.call::<bool>("go_back", json!({})).map(drop)
    }

    fn location(&self) -> Result<String> {
        self.call("location", json!({}))
    }

    fn wait(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
