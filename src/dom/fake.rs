//! Scripted in-memory page for unit tests.
//!
//! Models the two views the export moves between: the saved list (shown while the
//! location equals the list address) and a place detail view (any other location).
//! Node handles remember which view they came from and behave as stale handles
//! once the other view is showing.

use crate::dom::{Document, Role, ScrollMetrics, SelectorTable};
use crate::error::{ExportError, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;

pub(crate) const LIST_URL: &str = "https://www.google.com/maps/@48.2082,16.3738,13z/data=!4m3!11m2!2sTrip!3e3";
pub(crate) const LIST_TITLE: &str = "Vienna Trip";

/// First default selector for a role
pub(crate) fn selector(role: Role) -> String {
    SelectorTable::google_maps().queries(role)[0].clone()
}

/// A typical saved-place card: an action button wrapping a headline span
pub(crate) fn place_card(name: &str) -> FakeElement {
    FakeElement::new("button")
        .with_attribute("jsaction", "pane.wfvdle.placeCard;focus:pane.focusCard")
        .matching(selector(Role::ListItem))
        .with_child(
            FakeElement::new("div").with_attribute("class", "fontHeadlineSmall").with_child(
                FakeElement::new("span")
                    .with_attribute("dir", "ltr")
                    .with_text(name)
                    .matching(selector(Role::Heading)),
            ),
        )
}

/// Element description used to build fake pages
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeElement {
    pub tag: String,
    pub attributes: HashMap<String, String>,
    pub text: Option<String>,
    /// Selectors this element answers to beyond the simple `tag[attr]` forms
    pub matches: Vec<String>,
    pub children: Vec<FakeElement>,
    /// Location reached when the element is clicked
    pub navigates_to: Option<String>,
    /// Number of scrolls needed before the element is rendered
    pub revealed_after: u32,
    pub scrollable: bool,
}

impl FakeElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into(), ..Default::default() }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn matching(mut self, selector: impl Into<String>) -> Self {
        self.matches.push(selector.into());
        self
    }

    pub fn with_child(mut self, child: FakeElement) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: Vec<FakeElement>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn navigates_to(mut self, location: impl Into<String>) -> Self {
        self.navigates_to = Some(location.into());
        self
    }

    pub fn revealed_after(mut self, scrolls: u32) -> Self {
        self.revealed_after = scrolls;
        self
    }

    pub fn scrollable(mut self) -> Self {
        self.scrollable = true;
        self
    }

    fn matches(&self, selector: &str) -> bool {
        if self.matches.iter().any(|m| m == selector) {
            return true;
        }
        selector.split(',').any(|part| self.matches_simple(part.trim()))
    }

    /// `tag`, `*`, `[attr]` and `tag[attr][attr]` forms; anything else needs `matching`
    fn matches_simple(&self, part: &str) -> bool {
        if part.is_empty() {
            return false;
        }
        let (tag, mut rest) = match part.find('[') {
            Some(i) => (&part[..i], &part[i..]),
            None => (part, ""),
        };
        if !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '*') {
            return false;
        }
        if !(tag.is_empty() || tag == "*" || self.tag.eq_ignore_ascii_case(tag)) {
            return false;
        }
        while !rest.is_empty() {
            let Some(end) = rest.find(']') else {
                return false;
            };
            let name = &rest[1..end];
            if !rest.starts_with('[') || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
                return false;
            }
            if !self.attributes.contains_key(name) {
                return false;
            }
            rest = &rest[end + 1..];
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum View {
    List,
    Detail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FakeNode {
    view: View,
    id: usize,
}

#[derive(Debug)]
struct Slot {
    element: FakeElement,
    parent: Option<usize>,
    children: Vec<usize>,
}

#[derive(Debug, Default)]
struct Tree {
    slots: Vec<Slot>,
}

impl Tree {
    fn build(children: Vec<FakeElement>) -> Self {
        let mut tree = Self::default();
        tree.push(FakeElement::new("body").with_children(children), None);
        tree
    }

    fn push(&mut self, mut element: FakeElement, parent: Option<usize>) -> usize {
        let children = std::mem::take(&mut element.children);
        let id = self.slots.len();
        self.slots.push(Slot { element, parent, children: Vec::new() });
        for child in children {
            let child_id = self.push(child, Some(id));
            self.slots[id].children.push(child_id);
        }
        id
    }

    /// Descendants of `id` in document order, excluding `id`
    fn descendants(&self, id: usize) -> Vec<usize> {
        let mut out = Vec::new();
        for &child in &self.slots[id].children {
            out.push(child);
            out.extend(self.descendants(child));
        }
        out
    }

    fn is_rendered(&self, id: usize, scrolls: u32) -> bool {
        let slot = &self.slots[id];
        slot.element.revealed_after <= scrolls && slot.parent.is_none_or(|parent| self.is_rendered(parent, scrolls))
    }

    fn growth_steps(&self) -> u32 {
        self.slots.iter().map(|s| s.element.revealed_after).max().unwrap_or(0)
    }
}

/// How the page reacts to "navigate back"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BackBehavior {
    Immediate,
    /// Only the n-th back command after a departure takes effect
    SucceedOn(u32),
    Never,
}

#[derive(Debug, Default)]
struct FakeState {
    location: String,
    history: Vec<String>,
    scrolls: u32,
    elapsed: Duration,
    clicks: Vec<String>,
    back_calls: u32,
    backs_since_departure: u32,
    queries: Vec<String>,
}

pub(crate) struct FakePage {
    list_location: String,
    list: Tree,
    detail: Tree,
    back: BackBehavior,
    state: RefCell<FakeState>,
}

pub(crate) struct FakePageBuilder {
    list_location: String,
    list_title: Option<String>,
    list_children: Vec<FakeElement>,
    detail_title: String,
    back: BackBehavior,
}

impl FakePageBuilder {
    /// List view titled `title` containing `children`
    pub fn list_view(mut self, title: &str, children: Vec<FakeElement>) -> Self {
        self.list_title = Some(title.to_string());
        self.list_children = children;
        self
    }

    pub fn without_title(mut self) -> Self {
        self.list_title = None;
        self
    }

    pub fn back(mut self, behavior: BackBehavior) -> Self {
        self.back = behavior;
        self
    }

    pub fn build(self) -> FakePage {
        let title = |text: &str| {
            FakeElement::new("h1")
                .with_attribute("class", "fontTitleLarge")
                .with_text(text)
                .matching("h1.fontTitleLarge")
        };

        let mut list_children = Vec::new();
        if let Some(list_title) = &self.list_title {
            list_children.push(title(list_title));
        }
        list_children.extend(self.list_children);

        FakePage {
            list: Tree::build(list_children),
            detail: Tree::build(vec![title(&self.detail_title)]),
            back: self.back,
            state: RefCell::new(FakeState { location: self.list_location.clone(), ..Default::default() }),
            list_location: self.list_location,
        }
    }
}

impl FakePage {
    pub fn builder() -> FakePageBuilder {
        FakePageBuilder {
            list_location: LIST_URL.to_string(),
            list_title: Some(LIST_TITLE.to_string()),
            list_children: Vec::new(),
            detail_title: "Place details".to_string(),
            back: BackBehavior::Immediate,
        }
    }

    /// Saved list with the default title containing `cards`
    pub fn with_cards(cards: Vec<FakeElement>) -> Self {
        Self::builder().list_view(LIST_TITLE, cards).build()
    }

    /// Text of every clicked element, in order
    pub fn clicks(&self) -> Vec<String> {
        self.state.borrow().clicks.clone()
    }

    pub fn back_calls(&self) -> u32 {
        self.state.borrow().back_calls
    }

    pub fn scrolls(&self) -> u32 {
        self.state.borrow().scrolls
    }

    pub fn elapsed(&self) -> Duration {
        self.state.borrow().elapsed
    }

    pub fn was_queried(&self, selector: &str) -> bool {
        self.state.borrow().queries.iter().any(|q| q == selector)
    }

    pub fn current_location(&self) -> String {
        self.state.borrow().location.clone()
    }

    fn view(&self) -> View {
        if self.state.borrow().location == self.list_location { View::List } else { View::Detail }
    }

    fn tree(&self, view: View) -> &Tree {
        match view {
            View::List => &self.list,
            View::Detail => &self.detail,
        }
    }

    /// Slot for a live handle; `None` once the handle went stale
    fn live(&self, node: &FakeNode) -> Option<&Slot> {
        (node.view == self.view()).then(|| &self.tree(node.view).slots[node.id])
    }
}

impl Document for FakePage {
    type Node = FakeNode;

    fn query_all(&self, scope: Option<&FakeNode>, selector: &str) -> Result<Vec<FakeNode>> {
        self.state.borrow_mut().queries.push(selector.to_string());
        let view = self.view();
        let tree = self.tree(view);
        let root = match scope {
            Some(node) if node.view != view => return Ok(Vec::new()),
            Some(node) => node.id,
            None => 0,
        };
        let scrolls = self.state.borrow().scrolls;

        Ok(tree
            .descendants(root)
            .into_iter()
            .filter(|&id| tree.is_rendered(id, scrolls) && tree.slots[id].element.matches(selector))
            .map(|id| FakeNode { view, id })
            .collect())
    }

    fn closest(&self, node: &FakeNode, selector: &str) -> Result<Option<FakeNode>> {
        if self.live(node).is_none() {
            return Ok(None);
        }
        let tree = self.tree(node.view);
        let mut current = Some(node.id);
        while let Some(id) = current {
            if tree.slots[id].element.matches(selector) {
                return Ok(Some(FakeNode { view: node.view, id }));
            }
            current = tree.slots[id].parent;
        }
        Ok(None)
    }

    fn text(&self, node: &FakeNode) -> Result<String> {
        if self.live(node).is_none() {
            return Ok(String::new());
        }
        let tree = self.tree(node.view);
        let scrolls = self.state.borrow().scrolls;
        let parts: Vec<&str> = std::iter::once(node.id)
            .chain(tree.descendants(node.id))
            .filter(|&id| tree.is_rendered(id, scrolls))
            .filter_map(|id| tree.slots[id].element.text.as_deref())
            .collect();
        Ok(parts.join("\n").trim().to_string())
    }

    fn attribute(&self, node: &FakeNode, name: &str) -> Result<Option<String>> {
        Ok(self.live(node).and_then(|slot| slot.element.attributes.get(name).cloned()))
    }

    fn scroll_metrics(&self, node: &FakeNode) -> Result<ScrollMetrics> {
        match self.live(node) {
            Some(slot) if slot.element.scrollable => {
                let grown = self.state.borrow().scrolls.min(self.list.growth_steps());
                Ok(ScrollMetrics::new(700.0 + 100.0 * f64::from(grown), 600.0))
            }
            _ => Ok(ScrollMetrics::default()),
        }
    }

    fn scroll_to_end(&self, node: &FakeNode) -> Result<()> {
        if self.live(node).is_some_and(|slot| slot.element.scrollable) {
            self.state.borrow_mut().scrolls += 1;
        }
        Ok(())
    }

    fn click(&self, node: &FakeNode) -> Result<()> {
        let slot = self.live(node).ok_or_else(|| ExportError::EvaluationFailed("stale node".to_string()))?;
        let text = self.text(node)?;
        let mut state = self.state.borrow_mut();
        state.clicks.push(text);
        if let Some(target) = &slot.element.navigates_to {
            let previous = std::mem::replace(&mut state.location, target.clone());
            state.history.push(previous);
            state.backs_since_departure = 0;
        }
        Ok(())
    }

    fn go_back(&self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.back_calls += 1;
        state.backs_since_departure += 1;
        let succeeds = match self.back {
            BackBehavior::Immediate => true,
            BackBehavior::SucceedOn(n) => state.backs_since_departure >= n,
            BackBehavior::Never => false,
        };
        if succeeds {
            if let Some(previous) = state.history.pop() {
                state.location = previous;
            }
        }
        Ok(())
    }

    fn location(&self) -> Result<String> {
        Ok(self.state.borrow().location.clone())
    }

    fn wait(&self, duration: Duration) {
        self.state.borrow_mut().elapsed += duration;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_selector_matching() {
        let link = FakeElement::new("a").with_attribute("href", "/maps/place/x");
        assert!(link.matches("a[href]"));
        assert!(link.matches("span, a"));
        assert!(link.matches("*"));
        assert!(!link.matches("a[title]"));
        assert!(!link.matches(r#"a[href*="maps"]"#));
        assert!(link.clone().matching(r#"a[href*="maps"]"#).matches(r#"a[href*="maps"]"#));
    }

    #[test]
    fn test_handles_go_stale_after_navigation() {
        let page = FakePage::with_cards(vec![place_card("Prater").navigates_to("https://www.google.com/maps/place/Prater")]);
        let card = page.query_all(None, &selector(Role::ListItem)).unwrap()[0];

        assert_eq!(page.text(&card).unwrap(), "Prater");
        page.click(&card).unwrap();

        assert_eq!(page.text(&card).unwrap(), "");
        assert!(page.click(&card).is_err());

        page.go_back().unwrap();
        assert_eq!(page.current_location(), LIST_URL);
        assert_eq!(page.text(&card).unwrap(), "Prater");
    }

    #[test]
    fn test_back_succeeds_on_nth_attempt() {
        let page = FakePage::builder()
            .list_view(LIST_TITLE, vec![place_card("Prater").navigates_to("https://www.google.com/maps/place/Prater")])
            .back(BackBehavior::SucceedOn(2))
            .build();
        let card = page.query_first(None, &selector(Role::ListItem)).unwrap().unwrap();
        page.click(&card).unwrap();

        page.go_back().unwrap();
        assert_ne!(page.current_location(), LIST_URL);
        page.go_back().unwrap();
        assert_eq!(page.current_location(), LIST_URL);
    }
}
