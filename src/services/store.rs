//! JSON file store for categories and entries
//!
//! Records live in `~/.punchcard/categories.json` and
//! `~/.punchcard/entries.json`, each a versioned document. Every access goes
//! through an advisory lock on `<data_dir>/.lock`: shared for reads,
//! exclusive for a whole load-modify-save. Documents are written to a fresh
//! temp file in the data dir and renamed over the target.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use directories::BaseDirs;
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::services::aggregator::EntryLookup;
use crate::services::validation::{validate_entry, validate_hours};
use crate::services::CategoryTree;
use crate::types::{Category, Entry, EntryId, NewEntry, PunchcardError, Result};

/// Bumped whenever the record layout changes incompatibly
pub const STORE_VERSION: u32 = 1;

const CATEGORIES_FILE: &str = "categories.json";
const ENTRIES_FILE: &str = "entries.json";
const LOCK_FILE: &str = ".lock";

#[derive(Debug, Serialize, Deserialize)]
pub struct StoreDocument<R> {
    pub version: u32,
    pub updated_at: i64,
    pub records: R,
}

/// Held lock on the store; released on drop
struct StoreLock {
    file: File,
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

pub struct JsonStore {
    data_dir: PathBuf,
}

impl JsonStore {
    /// Store under `~/.punchcard`
    pub fn open_default() -> Result<Self> {
        let base_dirs = BaseDirs::new()
            .ok_or_else(|| PunchcardError::Store("Cannot determine home directory".into()))?;
        Self::open(base_dirs.home_dir().join(".punchcard"))
    }

    /// Store under `data_dir`, creating it when missing
    pub fn open(data_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir })
    }

    pub fn with_dir(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn categories_path(&self) -> PathBuf {
        self.data_dir.join(CATEGORIES_FILE)
    }

    pub fn entries_path(&self) -> PathBuf {
        self.data_dir.join(ENTRIES_FILE)
    }

    fn lock(&self, exclusive: bool) -> Result<StoreLock> {
        fs::create_dir_all(&self.data_dir)?;
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.data_dir.join(LOCK_FILE))?;

        let locked = if exclusive {
            FileExt::lock_exclusive(&file)
        } else {
            FileExt::lock_shared(&file)
        };
        locked.map_err(|e| PunchcardError::Store(format!("Failed to lock store: {}", e)))?;
        Ok(StoreLock { file })
    }

    fn read_tree(&self) -> Result<CategoryTree> {
        let categories: Vec<Category> = load_records(&self.categories_path())?;
        Ok(CategoryTree::from_categories(categories))
    }

    fn write_tree(&self, tree: &CategoryTree) -> Result<()> {
        let categories: Vec<&Category> = tree.iter().collect();
        save_records(&self.data_dir, &self.categories_path(), &categories)
    }

    /// Snapshot of every category, inactive ones included
    pub fn load_tree(&self) -> Result<CategoryTree> {
        let _lock = self.lock(false)?;
        self.read_tree()
    }

    pub fn save_tree(&self, tree: &CategoryTree) -> Result<()> {
        let _lock = self.lock(true)?;
        self.write_tree(tree)
    }

    /// Load the tree, apply `change` and save the result, all under one
    /// exclusive lock. Nothing is written when `change` fails.
    pub fn update_tree<T, F>(&self, change: F) -> Result<T>
    where
        F: FnOnce(&mut CategoryTree) -> Result<T>,
    {
        let _lock = self.lock(true)?;
        let mut tree = self.read_tree()?;
        let output = change(&mut tree)?;
        self.write_tree(&tree)?;
        Ok(output)
    }

    pub fn load_entries(&self) -> Result<Vec<Entry>> {
        let _lock = self.lock(false)?;
        load_records(&self.entries_path())
    }

    fn write_entries(&self, entries: &[Entry]) -> Result<()> {
        save_records(&self.data_dir, &self.entries_path(), entries)
    }

    pub fn get_entry(&self, id: EntryId) -> Result<Entry> {
        self.load_entries()?
            .into_iter()
            .find(|e| e.id == id)
            .ok_or(PunchcardError::UnknownEntry(id))
    }

    /// Entries newest first, ties ordered by category then id
    pub fn list_entries(&self) -> Result<Vec<Entry>> {
        let mut entries = self.load_entries()?;
        entries.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then(a.category.cmp(&b.category))
                .then(a.id.cmp(&b.id))
        });
        Ok(entries)
    }

    /// Validate and append a new entry, returning it with its assigned id
    pub fn add_entry(&self, new: NewEntry) -> Result<Entry> {
        let _lock = self.lock(true)?;
        let tree = self.read_tree()?;
        validate_entry(&new, &tree)?;

        let mut entries: Vec<Entry> = load_records(&self.entries_path())?;
        let next = entries.iter().map(|e| e.id.0).max().unwrap_or(0) + 1;
        let entry = new.into_entry(EntryId(next));
        entries.push(entry.clone());
        self.write_entries(&entries)?;

        tracing::debug!(id = %entry.id, category = %entry.category, "entry added");
        Ok(entry)
    }

    /// Replace the fields of an existing entry
    pub fn edit_entry(&self, id: EntryId, new: NewEntry) -> Result<Entry> {
        let _lock = self.lock(true)?;
        let tree = self.read_tree()?;
        let mut entries: Vec<Entry> = load_records(&self.entries_path())?;
        let slot = entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(PunchcardError::UnknownEntry(id))?;

        // Entries already logged against a now inactive category may keep it
        if new.category == slot.category {
            validate_hours(new.hours)?;
        } else {
            validate_entry(&new, &tree)?;
        }

        *slot = new.into_entry(id);
        let entry = slot.clone();
        self.write_entries(&entries)?;

        tracing::debug!(id = %entry.id, "entry updated");
        Ok(entry)
    }
}

impl EntryLookup for JsonStore {
    fn find_entries_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Entry>> {
        self.load_entries()?.find_entries_in_range(start, end)
    }
}

/// Read the records of a store document. A missing file holds no records.
/// Callers hold the store lock.
fn load_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "store file missing, starting empty");
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path)?;
    let document: StoreDocument<Vec<T>> = serde_json::from_str(&content).map_err(|e| {
        PunchcardError::Store(format!("Corrupted store file {}: {}", path.display(), e))
    })?;

    if document.version != STORE_VERSION {
        return Err(PunchcardError::Store(format!(
            "{} has version {}, expected {}",
            path.display(),
            document.version,
            STORE_VERSION
        )));
    }

    Ok(document.records)
}

/// Write `records` to a uniquely named temp file in `dir`, then rename it
/// over `path`. Callers hold the exclusive store lock.
fn save_records<T: Serialize>(dir: &Path, path: &Path, records: &[T]) -> Result<()> {
    fs::create_dir_all(dir)?;

    let document = StoreDocument {
        version: STORE_VERSION,
        updated_at: chrono::Utc::now().timestamp(),
        records,
    };
    let content = serde_json::to_vec_pretty(&document)
        .map_err(|e| PunchcardError::Store(format!("Serialization failed: {}", e)))?;

    let mut temp = NamedTempFile::new_in(dir)
        .map_err(|e| PunchcardError::Store(format!("Failed to create temp file: {}", e)))?;
    temp.write_all(&content)
        .map_err(|e| PunchcardError::Store(format!("Failed to write temp file: {}", e)))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| PunchcardError::Store(format!("Failed to sync temp file: {}", e)))?;
    temp.persist(path).map_err(|e| {
        PunchcardError::Store(format!("Failed to replace {}: {}", path.display(), e.error))
    })?;

    tracing::debug!(path = %path.display(), count = records.len(), "store file written");
    Ok(())
}
