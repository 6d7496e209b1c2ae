//! Scan history persisted as one JSON list under a fixed key.

use anyhow::{Context, Result};
use chrono::{DateTime, Local, SecondsFormat, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

pub const SCAN_HISTORY_KEY: &str = "agriGeniusScannedPlants";

/// String key-value storage, the local equivalent of browser storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// One JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create storage directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            anyhow::bail!("Invalid storage key: {:?}", key);
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Some(contents))
    }

    /// Writes to a sibling temp file and renames it over the target.
    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        let tmp = self.dir.join(format!(".{}.json.tmp", key));

        fs::write(&tmp, value).with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;

        tracing::debug!(key, bytes = value.len(), "Stored value");
        Ok(())
    }
}

/// Process-local store, mostly for tests.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRecord {
    /// Capture instant, RFC 3339 with milliseconds
    pub id: String,
    /// Image as a `data:` URL
    pub image_data: String,
    pub analysis_text: String,
    /// Local display time
    pub timestamp: String,
}

impl ScanRecord {
    pub fn capture(image_data: impl Into<String>, analysis_text: impl Into<String>) -> Self {
        Self::capture_at(Utc::now(), image_data, analysis_text)
    }

    pub fn capture_at(
        at: DateTime<Utc>,
        image_data: impl Into<String>,
        analysis_text: impl Into<String>,
    ) -> Self {
        Self {
            id: at.to_rfc3339_opts(SecondsFormat::Millis, true),
            image_data: image_data.into(),
            analysis_text: analysis_text.into(),
            timestamp: at
                .with_timezone(&Local)
                .format("%-m/%-d/%Y, %-I:%M:%S %p")
                .to_string(),
        }
    }

    /// Capture instant parsed back from the id, ignoring any `-n` suffix.
    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        let stamp = match self.id.find('Z') {
            Some(end) => &self.id[..=end],
            None => self.id.as_str(),
        };
        DateTime::parse_from_rfc3339(stamp)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Failed to read scan history: {0:#}")]
    Read(#[source] anyhow::Error),

    #[error("Failed to write scan history: {0:#}")]
    Write(#[source] anyhow::Error),

    #[error("Corrupt scan history: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Append-only list of past scans.
///
/// Single writer: the read-modify-write in `append` is not locked.
#[derive(Clone)]
pub struct ScanHistory {
    store: Arc<dyn KeyValueStore>,
}

impl ScanHistory {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn try_list(&self) -> Result<Vec<ScanRecord>, HistoryError> {
        match self.store.get(SCAN_HISTORY_KEY).map_err(HistoryError::Read)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    /// Records in insertion order; empty on any storage error.
    pub fn list(&self) -> Vec<ScanRecord> {
        self.try_list().unwrap_or_else(|e| {
            tracing::error!("Error fetching scan history: {}", e);
            Vec::new()
        })
    }

    /// Append a record, returning it as stored.
    ///
    /// An id already in the list gets a `-n` suffix so no scan is dropped.
    pub fn try_append(&self, mut record: ScanRecord) -> Result<ScanRecord, HistoryError> {
        let mut records = self.try_list()?;
        let taken = |id: &str| records.iter().any(|r| r.id == id);
        if taken(&record.id) {
            let base = record.id.clone();
            let mut n = 1u32;
            while taken(&format!("{}-{}", base, n)) {
                n += 1;
            }
            record.id = format!("{}-{}", base, n);
            tracing::debug!(id = %record.id, "Scan id already used, suffixed");
        }

        records.push(record.clone());
        let json = serde_json::to_string(&records)?;
        self.store
            .set(SCAN_HISTORY_KEY, &json)
            .map_err(HistoryError::Write)?;
        tracing::info!(count = records.len(), "Saved scan to history");
        Ok(record)
    }

    /// Best-effort append; failures are logged and reported as `false`.
    pub fn append(&self, record: ScanRecord) -> bool {
        match self.try_append(record) {
            Ok(_) => true,
            Err(e) => {
                tracing::error!("Error saving scan to history: {}", e);
                false
            }
        }
    }

    /// Most recent capture instant across all records.
    pub fn latest_capture(&self) -> Option<DateTime<Utc>> {
        self.list().iter().filter_map(ScanRecord::captured_at).max()
    }
}
