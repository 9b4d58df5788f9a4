//! Persistence of the last export as a single JSON snapshot

use crate::error::Result;
use crate::extract::{Extraction, PlaceRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// The stored result of one export run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSnapshot {
    #[serde(rename = "exportedPlaces")]
    pub exported_places: Vec<PlaceRecord>,

    #[serde(rename = "listName")]
    pub list_name: String,

    #[serde(rename = "exportedAt")]
    pub exported_at: DateTime<Utc>,
}

impl ExportSnapshot {
    pub fn new(list_name: impl Into<String>, exported_places: Vec<PlaceRecord>) -> Self {
        Self { exported_places, list_name: list_name.into(), exported_at: Utc::now() }
    }
}

impl From<Extraction> for ExportSnapshot {
    fn from(extraction: Extraction) -> Self {
        Self::new(extraction.list_title, extraction.records)
    }
}

/// File-backed store holding at most one snapshot
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the stored snapshot. Writes a sibling temp file and renames it over the target.
    pub fn save(&self, snapshot: &ExportSnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(snapshot)?)?;
        fs::rename(&tmp, &self.path)?;

        log::info!("Saved {} place(s) to {}", snapshot.exported_places.len(), self.path.display());
        Ok(())
    }

    /// Store the result of a run. A run that found no places leaves the previous
    /// snapshot in place and returns `None`.
    pub fn save_run(&self, extraction: Extraction) -> Result<Option<ExportSnapshot>> {
        if extraction.records.is_empty() {
            log::warn!("No places exported; keeping {} unchanged", self.path.display());
            return Ok(None);
        }

        let snapshot = ExportSnapshot::from(extraction);
        self.save(&snapshot)?;
        Ok(Some(snapshot))
    }

    /// The stored snapshot, or `None` when nothing was saved yet
    pub fn load(&self) -> Result<Option<ExportSnapshot>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove the stored snapshot; returns whether there was one
    pub fn clear(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
