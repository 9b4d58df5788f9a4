//! Place names: picking a label out of an item and rejecting UI noise

use crate::dom::{Document, Role, SelectorTable, Strategy, found};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

/// Prefix of the label given to items with no usable text
pub const PLACEHOLDER_PREFIX: &str = "Unnamed Place";

/// Interface strings that are never a heading on their own
const CHROME_WORDS: [&str; 5] = ["הערה", "שיתוף", "Note", "Share", "Dropped pin"];

/// Interface strings rejected anywhere inside a label (case-sensitive substring match)
const DENYLIST: &[&str] = &[
    "הערה",
    "שיתוף",
    "הוספה של הערה",
    "הוספת הערה",
    "Note",
    "Share",
    "Add a note",
    "Add note",
    "Dropped pin",
    "Pin",
    "מקום",
    "Place",
    "Location",
    "Edit",
    "עריכה",
    "Delete",
    "מחיקה",
    "לצפייה בתמונות",
    "סקירה כללית",
    "כרטיסים",
    "ביקורות",
    "מידע כללי",
    "מסלול",
    "נשמר",
    "שליחה לטלפון",
    "בקרבת מקום",
    "View photos",
    "Overview",
    "Tickets",
    "Reviews",
    "About",
    "Directions",
    "Saved",
    "Send to phone",
    "Nearby",
    "לייק",
    "כתיבת ביקורת",
    "עוד שאלות",
    "הוספת תמונות",
    "Like",
    "Write a review",
    "More questions",
    "Add photos",
];

static NUMERIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").expect("valid regex"));
static RATING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.\d+$").expect("valid regex"));
static TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+:\d+$").expect("valid regex"));
static PHONE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\+\d+|^\d{1,4}\s\d+").expect("valid regex"));

/// Why a label was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseReason {
    Placeholder,
    TooShort,
    Numeric,
    Rating,
    Timestamp,
    PhoneNumber,
    Denylisted(&'static str),
}

impl fmt::Display for NoiseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoiseReason::Placeholder => write!(f, "placeholder label"),
            NoiseReason::TooShort => write!(f, "shorter than 3 characters"),
            NoiseReason::Numeric => write!(f, "numbers only"),
            NoiseReason::Rating => write!(f, "looks like a rating"),
            NoiseReason::Timestamp => write!(f, "looks like a timestamp"),
            NoiseReason::PhoneNumber => write!(f, "looks like a phone number"),
            NoiseReason::Denylisted(word) => write!(f, "contains interface text \"{}\"", word),
        }
    }
}

/// Classify a label as noise, returning the first reason that applies
pub fn is_noise(label: &str) -> Option<NoiseReason> {
    if label.starts_with(PLACEHOLDER_PREFIX) {
        return Some(NoiseReason::Placeholder);
    }
    if label.chars().count() < 3 {
        return Some(NoiseReason::TooShort);
    }
    if NUMERIC.is_match(label) {
        return Some(NoiseReason::Numeric);
    }
    if RATING.is_match(label) {
        return Some(NoiseReason::Rating);
    }
    if TIMESTAMP.is_match(label) {
        return Some(NoiseReason::Timestamp);
    }
    if PHONE.is_match(label) {
        return Some(NoiseReason::PhoneNumber);
    }
    DENYLIST.iter().copied().find(|word| label.contains(word)).map(NoiseReason::Denylisted)
}

fn is_chrome_word(text: &str) -> bool {
    CHROME_WORDS.contains(&text)
}

fn reasonable_length(text: &str) -> bool {
    let len = text.chars().count();
    len > 2 && len < 100
}

/// Structural heading candidates: no ratings, counts or parenthesised annotations
fn is_heading_text(text: &str) -> bool {
    reasonable_length(text)
        && !is_chrome_word(text)
        && !RATING.is_match(text)
        && !NUMERIC.is_match(text)
        && !text.contains("כוכב")
        && !text.contains("star")
        && !text.contains('(')
}

fn is_fallback_text(text: &str) -> bool {
    reasonable_length(text) && !text.contains('(') && !RATING.is_match(text) && !is_chrome_word(text)
}

/// Where a label came from
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelSource {
    Heading(Strategy),
    TextScan(Strategy),
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Label {
    pub text: String,
    pub source: LabelSource,
}

impl Label {
    fn placeholder(position: usize) -> Self {
        Self { text: format!("{} {}", PLACEHOLDER_PREFIX, position + 1), source: LabelSource::Placeholder }
    }
}

/// Derives a display name for a list item
pub struct Labeler<'a> {
    table: &'a SelectorTable,
}

impl<'a> Labeler<'a> {
    pub fn new(table: &'a SelectorTable) -> Self {
        Self { table }
    }

    /// Heading first, then a scan of text-bearing descendants, then a numbered placeholder
    pub fn label_of<D: Document + ?Sized>(&self, doc: &D, item: &D::Node, position: usize) -> Label {
        let text_of = |node: &D::Node| found(doc.text(node), "read label text").unwrap_or_default();

        if let Some(located) =
            self.table.locate_first(doc, Some(item), Role::Heading, |node| is_heading_text(&text_of(node)))
        {
            return Label { text: text_of(&located.node), source: LabelSource::Heading(located.strategy) };
        }

        if let Some(located) =
            self.table.locate_first(doc, Some(item), Role::TextFallback, |node| is_fallback_text(&text_of(node)))
        {
            log::debug!("No heading for item {}; using text scan", position + 1);
            return Label { text: text_of(&located.node), source: LabelSource::TextScan(located.strategy) };
        }

        Label::placeholder(position)
    }
}
