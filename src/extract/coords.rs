//! Coordinate parsing for map links and encoded item metadata

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

const FORGIVING: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);
const STANDARD: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, FORGIVING);
const URL_SAFE: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, FORGIVING);

static METADATA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"metadata:(\[.*?\])").expect("valid regex"));
static DECIMAL_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(-?\d+\.\d+),(-?\d+\.\d+)").expect("valid regex"));

/// Conventions are tried in this order; the first valid match wins
static CONVENTIONS: LazyLock<Vec<(LinkConvention, Regex)>> = LazyLock::new(|| {
    [
        (LinkConvention::PlaceData, r"!3d(-?\d+\.\d+)!4d(-?\d+\.\d+)"),
        (LinkConvention::Viewport, r"@(-?\d+\.\d+),(-?\d+\.\d+)"),
        (LinkConvention::LatLngParam, r"ll=(-?\d+\.\d+),(-?\d+\.\d+)"),
        (LinkConvention::Center, r"center=(-?\d+\.\d+),(-?\d+\.\d+)"),
    ]
    .into_iter()
    .map(|(convention, pattern)| (convention, Regex::new(pattern).expect("valid regex")))
    .collect()
});

/// A latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Build a pair, rejecting values outside the valid degree ranges
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let valid = (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude);
        valid.then_some(Self { latitude, longitude })
    }

    fn from_captures(lat: &str, lng: &str) -> Option<Self> {
        Self::new(lat.parse().ok()?, lng.parse().ok()?)
    }
}

/// How a map address encodes a position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkConvention {
    /// `!3d<lat>!4d<lng>` in the place data segment
    PlaceData,
    /// `@<lat>,<lng>` viewport center
    Viewport,
    /// `ll=<lat>,<lng>` query parameter
    LatLngParam,
    /// `center=<lat>,<lng>` query parameter
    Center,
}

/// Coordinates encoded in a map address
pub fn from_link(address: &str) -> Option<(Coordinates, LinkConvention)> {
    CONVENTIONS.iter().find_map(|(convention, pattern)| {
        let caps = pattern.captures(address)?;
        Coordinates::from_captures(&caps[1], &caps[2]).map(|coords| (coords, *convention))
    })
}

/// Coordinates hidden in the base64 `metadata:[...]` segment of a `jslog` attribute
pub fn from_metadata(jslog: &str) -> Option<Coordinates> {
    let payload = METADATA.captures(jslog)?.get(1)?.as_str();
    let inner = payload.get(2..payload.len().saturating_sub(2))?;

    let decoded = STANDARD.decode(inner).or_else(|_| URL_SAFE.decode(inner)).ok()?;
    let text = String::from_utf8_lossy(&decoded);

    let caps = DECIMAL_PAIR.captures(&text)?;
    Coordinates::from_captures(&caps[1], &caps[2])
}
