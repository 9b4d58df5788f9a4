use crate::dom::{Document, found};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// UI role a selector strategy locates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Scrollable side panel hosting the virtualized list
    ScrollContainer,
    /// Heading carrying the list's title
    ListTitle,
    /// One saved place in the list
    ListItem,
    /// Structural heading inside an item
    Heading,
    /// Broad scan of text-bearing descendants when no heading matches
    TextFallback,
    /// Element carrying the encoded `jslog` metadata blob
    MetadataCarrier,
    /// Anchor whose address may encode coordinates
    CoordinateLink,
    /// Clickable element inside an item
    ActionTarget,
    /// Element (or ancestor) carrying a `jsaction` handler
    ActionOwner,
}

/// The strategy that located an element
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Strategy {
    pub role: Role,
    /// Position of the selector in the role's list
    pub index: usize,
    pub selector: String,
}

/// A single element located through the table
#[derive(Debug, Clone)]
pub struct Located<N> {
    pub node: N,
    pub strategy: Strategy,
}

/// All valid elements produced by the first successful strategy
#[derive(Debug, Clone)]
pub struct LocatedAll<N> {
    pub nodes: Vec<N>,
    pub strategy: Strategy,
}

/// Ordered selector strategies per role.
///
/// Selectors are tried in order; the first one producing an element that passes
/// the caller's validity predicate wins. Deserializing a table overlays the given
/// roles on top of [`SelectorTable::google_maps`], so a config file only needs to
/// name the roles it wants to change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SelectorTable {
    entries: IndexMap<Role, Vec<String>>,
}

impl SelectorTable {
    /// Create an empty table (every role resolves to "not found")
    pub fn new() -> Self {
        Self { entries: IndexMap::new() }
    }

    /// Selectors for the Google Maps saved-list side panel
    pub fn google_maps() -> Self {
        Self::new()
            .with(
                Role::ScrollContainer,
                [
                    r#"[jsaction*="pane.scroll"]"#,
                    r#"[role="region"]"#,
                    r#"[data-value="Saved"]"#,
                    ".widget-pane-content",
                    ".section-scrollbox",
                    r#"[class*="scrollbox"]"#,
                    r#"[class*="pane"]"#,
                ],
            )
            .with(
                Role::ListTitle,
                [
                    "h1.fontTitleLarge",
                    r#"h1[class*="fontTitle"]"#,
                    r#"h1[class*="Title"]"#,
                    ".title, .heading, h1, h2",
                    r#"[class*="title"]"#,
                ],
            )
            .with(
                Role::ListItem,
                [
                    r#"button[jsaction*="pane.wfvdle"]"#,
                    r#"button[jsaction*="pane."]"#,
                    r#"[jsaction*="pane."] button"#,
                    "button[jsaction][jslog]",
                    r#"div[role="button"][jsaction]"#,
                    r#"button:has(img):has([class*="font"])"#,
                    r#"div[role="button"]:has(img)"#,
                    r#"button:has([class*="rating"]), button:has([aria-label*="star"])"#,
                    r#"button:has([dir="ltr"])"#,
                    ".Nv2PK.THOPZb.CpccDe",
                    "[data-value]",
                    r#"[jsaction*="place"]"#,
                ],
            )
            .with(
                Role::Heading,
                [
                    r#"[class*="headline"] span[dir="ltr"]"#,
                    r#"[class*="title"] span[dir="ltr"]"#,
                    r#"span[dir="ltr"]:not([aria-label*="star"]):not([aria-label*="כוכב"])"#,
                    r#"[class*="font"][class*="large"] span[dir="ltr"]"#,
                    r#"[class*="font"][class*="medium"] span[dir="ltr"]"#,
                ],
            )
            .with(Role::TextFallback, ["span, div"])
            .with(Role::MetadataCarrier, ["[jslog]"])
            .with(Role::CoordinateLink, ["a[href]"])
            .with(Role::ActionTarget, ["button"])
            .with(Role::ActionOwner, ["[jsaction]"])
    }

    /// Builder method: replace the selectors for a role
    pub fn with<I, S>(mut self, role: Role, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set(role, selectors);
        self
    }

    /// Replace the selectors for a role
    pub fn set<I, S>(&mut self, role: Role, selectors: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries.insert(role, selectors.into_iter().map(Into::into).collect());
    }

    /// Selectors for a role, in priority order
    pub fn queries(&self, role: Role) -> &[String] {
        self.entries.get(&role).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First element of the first strategy that yields a valid one
    pub fn locate_first<D, F>(
        &self,
        doc: &D,
        scope: Option<&D::Node>,
        role: Role,
        mut valid: F,
    ) -> Option<Located<D::Node>>
    where
        D: Document + ?Sized,
        F: FnMut(&D::Node) -> bool,
    {
        for (index, selector) in self.queries(role).iter().enumerate() {
            let Some(nodes) = found(doc.query_all(scope, selector), selector) else {
                continue;
            };

            if let Some(node) = nodes.into_iter().find(|node| valid(node)) {
                log::debug!("{:?} located with strategy {} ({})", role, index, selector);
                return Some(Located { node, strategy: Strategy { role, index, selector: selector.clone() } });
            }
        }

        None
    }

    /// Every valid element of the first strategy that yields at least one
    pub fn locate_all<D, F>(
        &self,
        doc: &D,
        scope: Option<&D::Node>,
        role: Role,
        mut valid: F,
    ) -> Option<LocatedAll<D::Node>>
    where
        D: Document + ?Sized,
        F: FnMut(&D::Node) -> bool,
    {
        for (index, selector) in self.queries(role).iter().enumerate() {
            let Some(nodes) = found(doc.query_all(scope, selector), selector) else {
                continue;
            };
            if nodes.is_empty() {
                continue;
            }

            let total = nodes.len();
            let nodes: Vec<_> = nodes.into_iter().filter(|node| valid(node)).collect();
            if !nodes.is_empty() {
                log::debug!("{:?}: {} of {} elements valid using {}", role, nodes.len(), total, selector);
                return Some(LocatedAll { nodes, strategy: Strategy { role, index, selector: selector.clone() } });
            }
        }

        None
    }
}

impl Default for SelectorTable {
    fn default() -> Self {
        Self::google_maps()
    }
}

impl<'de> Deserialize<'de> for SelectorTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let overrides = IndexMap::<Role, Vec<String>>::deserialize(deserializer)?;
        let mut table = Self::google_maps();
        for (role, selectors) in overrides {
            table.set(role, selectors);
        }
        Ok(table)
    }
}
