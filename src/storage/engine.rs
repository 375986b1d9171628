//! Storage engine: the authoritative record table and its file mirror
//!
//! The in-memory table is the authority; the data file is a mirror. Every
//! command that changes visible state calls `persist()` before the next
//! command is read.
//!
//! # Persist
//!
//! The whole table is serialized into memory first, then written to a
//! sibling temporary file, fsynced, and renamed over the data file. A
//! failed serialization or write never leaves a truncated data file.
//!
//! # Load
//!
//! Every entry is decoded into a staging map before anything touches the
//! live table. One bad entry fails the whole load.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use super::document::{decode_record, encode_table};
use super::errors::{StorageError, StorageErrorCode, StorageResult};
use crate::model::{Kind, Record};
use crate::observability::{log_event_with_fields, Event};

/// Single-owner record table keyed by `Kind.id`
#[derive(Debug)]
pub struct StorageEngine {
    /// Data file path
    path: PathBuf,
    /// Live records, sorted by key
    objects: BTreeMap<String, Record>,
}

impl StorageEngine {
    /// Creates an empty engine mirroring to `path`. Reads nothing.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            objects: BTreeMap::new(),
        }
    }

    /// Creates an engine and loads any existing data file.
    pub fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let mut engine = Self::new(path);
        engine.load()?;
        Ok(engine)
    }

    /// Returns the data file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the live table.
    pub fn all(&self) -> &BTreeMap<String, Record> {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Record> {
        self.objects.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Record> {
        self.objects.get_mut(key)
    }

    /// Inserts a record under `Kind.id`. An existing entry under the same
    /// key is replaced and returned.
    pub fn register(&mut self, record: Record) -> Option<Record> {
        self.objects.insert(record.key(), record)
    }

    /// Removes a record by key.
    pub fn remove(&mut self, key: &str) -> Option<Record> {
        self.objects.remove(key)
    }

    /// Iterates the records of one kind in key order.
    pub fn records_of(&self, kind: Kind) -> impl Iterator<Item = &Record> {
        self.objects
            .values()
            .filter(move |record| record.kind() == kind)
    }

    /// Number of records of one kind.
    pub fn count(&self, kind: Kind) -> usize {
        self.records_of(kind).count()
    }

    /// Writes the whole table to the data file, replacing its content.
    ///
    /// # Errors
    ///
    /// Returns `HBNB_STORAGE_WRITE_FAILED` if serialization, the write, the
    /// fsync, or the rename fails. The in-memory table is unaffected.
    pub fn persist(&self) -> StorageResult<()> {
        let document = Value::Object(encode_table(&self.objects));
        let bytes = serde_json::to_vec(&document).map_err(|e| {
            StorageError::write_failed_no_source(format!("Failed to serialize table: {}", e))
        })?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    StorageError::write_failed(
                        format!("Failed to create data directory: {}", parent.display()),
                        e,
                    )
                })?;
            }
        }

        let tmp_path = temp_path(&self.path);
        if let Err(e) = write_synced(&tmp_path, &bytes) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }

        fs::rename(&tmp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            StorageError::write_failed(
                format!("Failed to replace data file: {}", self.path.display()),
                e,
            )
        })?;

        let path = self.path.display().to_string();
        let records = self.objects.len().to_string();
        log_event_with_fields(
            Event::StoragePersisted,
            &[("path", path.as_str()), ("records", records.as_str())],
        );

        Ok(())
    }

    /// Loads the data file into the table.
    ///
    /// A missing file means no prior data. Loaded entries are installed
    /// under their stored keys, replacing live entries with the same key.
    ///
    /// Returns the number of entries loaded.
    ///
    /// # Errors
    ///
    /// - `HBNB_SCHEMA_DRIFT` if any entry's kind tag is unregistered
    /// - `HBNB_DATA_CORRUPTION` if the file or any entry is malformed
    /// - `HBNB_STORAGE_READ_FAILED` if the file exists but cannot be read
    pub fn load(&mut self) -> StorageResult<usize> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => {
                return Err(StorageError::read_failed(
                    format!("Failed to read data file: {}", self.path.display()),
                    e,
                ))
            }
        };

        if content.trim().is_empty() {
            return Ok(0);
        }

        let document: Map<String, Value> = serde_json::from_str(&content).map_err(|e| {
            StorageError::data_corruption(format!("Invalid data file JSON: {}", e))
        })?;

        let mut staged = BTreeMap::new();
        for (key, entry) in &document {
            match decode_record(key, entry) {
                Ok(record) => {
                    staged.insert(key.clone(), record);
                }
                Err(e) => {
                    if e.code() == StorageErrorCode::HbnbSchemaDrift {
                        log_event_with_fields(Event::SchemaDrift, &[("key", key.as_str())]);
                    }
                    return Err(e);
                }
            }
        }

        let loaded = staged.len();
        self.objects.extend(staged);

        let path = self.path.display().to_string();
        let records = loaded.to_string();
        log_event_with_fields(
            Event::StorageLoaded,
            &[("path", path.as_str()), ("records", records.as_str())],
        );

        Ok(loaded)
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("file.json"));
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_synced(path: &Path, bytes: &[u8]) -> StorageResult<()> {
    let mut file = File::create(path).map_err(|e| {
        StorageError::write_failed(format!("Failed to create {}", path.display()), e)
    })?;

    file.write_all(bytes).map_err(|e| {
        StorageError::write_failed(format!("Failed to write {}", path.display()), e)
    })?;

    file.sync_all().map_err(|e| {
        StorageError::write_failed(format!("Failed to fsync {}", path.display()), e)
    })?;

    Ok(())
}
