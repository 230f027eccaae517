//! Persistence for the practice log.
//!
//! The analytics engine never touches storage. This module is the keyed
//! get/set store the CLI uses to hold the record collection and the daily
//! target, plus a typed [`PracticeLog`] facade over it.
//!
//! Store file: `~/.studylog/store.json` (a flat JSON object of string values)

use std::collections::{BTreeMap, HashMap};
use std::fs::{self, create_dir_all};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::analytics::goal::DailyTarget;
use crate::record::PracticeRecord;

/// Key holding the JSON array of records.
pub const RECORDS_KEY: &str = "practice_records";
/// Key holding the daily set target.
pub const TARGET_KEY: &str = "daily_target";

// ---------------------------------------------------------------------------
// Key-value stores
// ---------------------------------------------------------------------------

/// A string-keyed store of string values.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// In-memory store.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by a single JSON object file.
///
/// Every `set` rewrites the whole file. A missing file reads as empty.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<data_dir>/store.json`.
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join("store.json"))
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read store file {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content)
            .with_context(|| format!("store file {} is not a JSON object", self.path.display()))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(&values).context("failed to serialize store")?;
        fs::write(&self.path, json)
            .with_context(|| format!("failed to write store file {}", self.path.display()))?;

        tracing::debug!(key, path = %self.path.display(), "store value written");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// PracticeLog
// ---------------------------------------------------------------------------

/// Typed access to the records and daily target held in a [`KeyValueStore`].
pub struct PracticeLog<S> {
    store: S,
}

impl<S: KeyValueStore> PracticeLog<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// Load every stored record.
    ///
    /// Entries that cannot be read as a record (bad date, unknown subject)
    /// are skipped with a warning rather than failing the whole load.
    pub fn records(&self) -> Result<Vec<PracticeRecord>> {
        let values = self.raw_records()?;

        let total = values.len();
        let records: Vec<PracticeRecord> = values
            .into_iter()
            .filter_map(|value| match serde_json::from_value(value) {
                Ok(record) => Some(record),
                Err(error) => {
                    tracing::warn!(%error, "skipping malformed practice record");
                    None
                }
            })
            .collect();

        tracing::debug!(loaded = records.len(), stored = total, "loaded practice records");
        Ok(records)
    }

    /// Stored entries as raw JSON, including ones `records()` would skip.
    ///
    /// Writers go through this so an unreadable entry is never dropped on save.
    fn raw_records(&self) -> Result<Vec<serde_json::Value>> {
        let Some(raw) = self.store.get(RECORDS_KEY)? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&raw).context("stored records are not a JSON array")
    }

    fn save_raw_records(&mut self, values: &[serde_json::Value]) -> Result<()> {
        let json = serde_json::to_string(values).context("failed to serialize records")?;
        self.store.set(RECORDS_KEY, &json)
    }

    /// Append a record, assigning a fresh id. Returns the stored record.
    pub fn add_record(&mut self, mut record: PracticeRecord) -> Result<PracticeRecord> {
        record.id = uuid::Uuid::new_v4().to_string();

        let mut values = self.raw_records()?;
        values.push(serde_json::to_value(&record).context("failed to serialize record")?);
        self.save_raw_records(&values)?;

        tracing::info!(id = %record.id, date = %record.date, subject = %record.subject, "record added");
        Ok(record)
    }

    /// Remove the record with `id`. Returns `false` if there was none.
    ///
    /// Matches on the raw `id` field, so entries that fail to load can be
    /// deleted too.
    pub fn delete_record(&mut self, id: &str) -> Result<bool> {
        let mut values = self.raw_records()?;
        let before = values.len();
        values.retain(|value| value.get("id").and_then(serde_json::Value::as_str) != Some(id));

        if values.len() == before {
            return Ok(false);
        }

        self.save_raw_records(&values)?;
        tracing::info!(id, "record deleted");
        Ok(true)
    }

    /// Stored daily target, or `default` when none (or an invalid one) is stored.
    pub fn daily_target(&self, default: DailyTarget) -> Result<DailyTarget> {
        let stored = self.store.get(TARGET_KEY)?;
        Ok(stored
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .and_then(DailyTarget::new)
            .unwrap_or(default))
    }

    /// Persist `proposed` as the daily target if it is positive.
    ///
    /// Returns `false` without writing anything otherwise.
    pub fn set_daily_target(&mut self, proposed: i64) -> Result<bool> {
        let Some(target) = DailyTarget::new(proposed) else {
            tracing::warn!(proposed, "rejected non-positive daily target");
            return Ok(false);
        };
        self.store.set(TARGET_KEY, &target.to_string())?;
        tracing::info!(target = target.get(), "daily target updated");
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
