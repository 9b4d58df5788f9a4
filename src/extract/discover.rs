use crate::dom::{Document, Role, SelectorTable, found};
use url::Url;

/// One list item found in the current discovery pass.
///
/// The handle is only good until the list re-renders, so candidates are rebuilt
/// on every pass and never kept across a navigation.
#[derive(Debug, Clone)]
pub struct PlaceCandidate<N> {
    pub handle: N,
    /// Zero-based position in the list
    pub position: usize,
    /// Extracted label, once known
    pub label: Option<String>,
    /// Absolute address of an associated anchor
    pub link: Option<String>,
    /// Raw `jslog` text carrying an encoded metadata blob
    pub metadata: Option<String>,
    /// First segment of the item's `jsaction` handler
    pub action: Option<String>,
}

impl<N> PlaceCandidate<N> {
    fn new(handle: N, position: usize) -> Self {
        Self { handle, position, label: None, link: None, metadata: None, action: None }
    }
}

/// Finds saved-place items in the live list
pub struct Discoverer<'a> {
    table: &'a SelectorTable,
}

impl<'a> Discoverer<'a> {
    pub fn new(table: &'a SelectorTable) -> Self {
        Self { table }
    }

    /// Items currently rendered, in list order. Each call queries the page again.
    pub fn current_items<D: Document + ?Sized>(&self, doc: &D) -> Vec<PlaceCandidate<D::Node>> {
        let qualifies = |node: &D::Node| {
            let text = found(doc.text(node), "read item text").unwrap_or_default();
            text.chars().count() > 3 && self.action_of(doc, node).is_some()
        };

        match self.table.locate_all(doc, None, Role::ListItem, qualifies) {
            Some(located) => {
                log::debug!("{} place cards found using {}", located.nodes.len(), located.strategy.selector);
                located.nodes.into_iter().enumerate().map(|(position, node)| PlaceCandidate::new(node, position)).collect()
            }
            None => Vec::new(),
        }
    }

    /// Fill in the link, metadata and action reference of a candidate
    pub fn inspect<D: Document + ?Sized>(&self, doc: &D, candidate: &mut PlaceCandidate<D::Node>) {
        candidate.link = self.link_of(doc, &candidate.handle);
        candidate.metadata = self.metadata_of(doc, &candidate.handle);
        candidate.action = self.action_of(doc, &candidate.handle);
    }

    /// First `jsaction` segment of the item or its nearest action-bearing ancestor
    pub fn action_of<D: Document + ?Sized>(&self, doc: &D, item: &D::Node) -> Option<String> {
        self.table.queries(Role::ActionOwner).iter().find_map(|selector| {
            let owner = found(doc.closest(item, selector), "find action owner")??;
            let handler = found(doc.attribute(&owner, "jsaction"), "read jsaction")??;
            let first = handler.split(';').next()?.trim();
            (!first.is_empty()).then(|| first.to_string())
        })
    }

    /// Absolute address of the item's anchor: a descendant first, then an enclosing one
    fn link_of<D: Document + ?Sized>(&self, doc: &D, item: &D::Node) -> Option<String> {
        let anchor = self
            .table
            .locate_first(doc, Some(item), Role::CoordinateLink, |_| true)
            .map(|located| located.node)
            .or_else(|| {
                self.table
                    .queries(Role::CoordinateLink)
                    .iter()
                    .find_map(|selector| found(doc.closest(item, selector), "find enclosing link").flatten())
            })?;

        let href = found(doc.attribute(&anchor, "href"), "read href")??;
        let base = found(doc.location(), "read location").unwrap_or_default();
        absolute(&base, &href)
    }

    /// `jslog` text mentioning `metadata`, from a carrier descendant or the item itself
    fn metadata_of<D: Document + ?Sized>(&self, doc: &D, item: &D::Node) -> Option<String> {
        let jslog_of = |node: &D::Node| {
            found(doc.attribute(node, "jslog"), "read jslog")
                .flatten()
                .filter(|jslog| jslog.contains("metadata"))
        };

        let carrier = self.table.locate_first(doc, Some(item), Role::MetadataCarrier, |node| jslog_of(node).is_some());
        match carrier {
            Some(located) => jslog_of(&located.node),
            None => jslog_of(item),
        }
    }
}

/// Resolve `href` against the page address the way a browser would
fn absolute(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    match Url::parse(base) {
        Ok(base) => base.join(href).ok().map(String::from),
        Err(_) => Url::parse(href).ok().map(String::from),
    }
}
