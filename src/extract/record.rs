use crate::extract::coords::Coordinates;
use serde::{Deserialize, Serialize};
use std::fmt;

const SEARCH_BASE: &str = "https://www.google.com/maps/search/";

/// One exported place.
///
/// Latitude and longitude are either both present or both absent: a record is
/// built from an `Option<Coordinates>` and deserializing a half pair fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPlaceRecord")]
pub struct PlaceRecord {
    name: String,
    link: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[derive(Deserialize)]
struct RawPlaceRecord {
    name: String,
    link: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[derive(Debug)]
pub struct InvalidRecord(&'static str);

impl fmt::Display for InvalidRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl TryFrom<RawPlaceRecord> for PlaceRecord {
    type Error = InvalidRecord;

    fn try_from(raw: RawPlaceRecord) -> Result<Self, Self::Error> {
        if raw.name.trim().is_empty() {
            return Err(InvalidRecord("place name is empty"));
        }
        let coordinates = match (raw.latitude, raw.longitude) {
            (Some(latitude), Some(longitude)) => {
                Some(Coordinates::new(latitude, longitude).ok_or(InvalidRecord("coordinates out of range"))?)
            }
            (None, None) => None,
            _ => return Err(InvalidRecord("latitude and longitude must both be present or both absent")),
        };
        Ok(Self::new(raw.name, raw.link, coordinates))
    }
}

impl PlaceRecord {
    pub fn new(name: impl Into<String>, link: impl Into<String>, coordinates: Option<Coordinates>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            link: link.into(),
            latitude: coordinates.map(|c| c.latitude),
            longitude: coordinates.map(|c| c.longitude),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    pub fn latitude(&self) -> Option<f64> {
        self.latitude
    }

    pub fn longitude(&self) -> Option<f64> {
        self.longitude
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        Some(Coordinates { latitude: self.latitude?, longitude: self.longitude? })
    }
}

/// Text search link used when a place's position could not be recovered
pub fn search_link(name: &str, suffix: Option<&str>) -> String {
    let query = match suffix {
        Some(suffix) if !suffix.trim().is_empty() => format!("{} {}", name.trim(), suffix.trim()),
        _ => name.trim().to_string(),
    };
    format!("{}{}", SEARCH_BASE, urlencoding::encode(&query))
}

/// Search link pinned to a known position
pub fn coordinate_link(coordinates: Coordinates) -> String {
    format!("{}?api=1&query={},{}", SEARCH_BASE, coordinates.latitude, coordinates.longitude)
}
