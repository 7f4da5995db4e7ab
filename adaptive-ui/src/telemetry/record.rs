//! Persisted session record.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;

/// Dwell seconds for one element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DwellEntry {
    pub element: String,
    pub seconds: f64,
}

/// Everything written at session end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub timestamp: DateTime<Utc>,
    pub mode: String,
    pub total_seconds: f64,
    /// One entry per element that was ever focused, sorted by name.
    pub dwell: Vec<DwellEntry>,
}

impl SessionRecord {
    pub fn new(timestamp_ms: i64, mode: &str, total_seconds: f64, dwell: Vec<DwellEntry>) -> Self {
        Self {
            timestamp: DateTime::<Utc>::from_timestamp_millis(timestamp_ms).unwrap_or_default(),
            mode: mode.to_string(),
            total_seconds,
            dwell,
        }
    }

    /// File name for this record: `session-<YYYYmmdd-HHMMSS>-<mode>.json`.
    pub fn file_name(&self) -> String {
        format!(
            "session-{}-{}.json",
            self.timestamp.format("%Y%m%d-%H%M%S"),
            self.mode
        )
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the record under `dir`, creating it if needed. Returns the
    /// path written.
    pub fn persist(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name());
        fs::write(&path, self.to_json()?)?;
        info!(
            "Session log written to {} ({} element(s), {:.1}s)",
            path.display(),
            self.dwell.len(),
            self.total_seconds
        );
        Ok(path)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
