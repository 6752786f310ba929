//! Local persistence of the session document between CLI invocations.
//!
//! One JSON file per data directory:
//! ```text
//! <DATA_DIR>/
//!   workout_data.json
//! ```
//! Writes go through a temp file and rename so a crash mid-save cannot
//! leave a truncated document behind.

use std::fs;
use std::io;
use std::path::PathBuf;

use crate::models::Document;

const DATA_FILE_NAME: &str = "workout_data.json";

/// Errors from local document storage.
#[derive(Debug)]
pub enum StorageError {
    /// I/O error reading or writing the data file.
    Io(PathBuf, io::Error),
    /// JSON error reading or writing the data file.
    Json(PathBuf, serde_json::Error),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(path, e) => {
                write!(f, "I/O error for {}: {}", path.display(), e)
            }
            StorageError::Json(path, e) => {
                write!(f, "JSON error for {}: {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(_, e) => Some(e),
            StorageError::Json(_, e) => Some(e),
        }
    }
}

/// File-backed storage for this device's copy of the document.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    data_dir: PathBuf,
}

impl LocalStorage {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn data_path(&self) -> PathBuf {
        self.data_dir.join(DATA_FILE_NAME)
    }

    /// Loads the stored document, or `None` if none has been saved yet.
    pub fn load(&self) -> Result<Option<Document>, StorageError> {
        let path = self.data_path();
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::Io(path, e)),
        };
        let doc = Document::from_bytes(&bytes).map_err(|e| StorageError::Json(path, e))?;
        Ok(Some(doc))
    }

    /// Loads the stored document, substituting the default empty document
    /// when none exists.
    pub fn load_or_default(&self) -> Result<Document, StorageError> {
        Ok(self.load()?.unwrap_or_default())
    }

    /// Saves the document atomically.
    pub fn save(&self, document: &Document) -> Result<(), StorageError> {
        let path = self.data_path();
        fs::create_dir_all(&self.data_dir).map_err(|e| StorageError::Io(path.clone(), e))?;

        let bytes = document
            .to_bytes()
            .map_err(|e| StorageError::Json(path.clone(), e))?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, &bytes).map_err(|e| StorageError::Io(tmp.clone(), e))?;
        fs::rename(&tmp, &path).map_err(|e| StorageError::Io(path, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LogEntry, Plan};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_load_missing_is_none() {
        let temp = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp.path());
        assert!(storage.load().unwrap().is_none());
        assert_eq!(storage.load_or_default().unwrap(), Document::new());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp.path());

        let mut doc = Document::new();
        doc.upsert_plan(Plan::new("Push", date("2025-01-06")));
        doc.logs
            .push(LogEntry::new(date("2025-01-06"), "Push", "dips", 0.0, 12, 3));

        storage.save(&doc).unwrap();
        let loaded = storage.load().unwrap().unwrap();
        assert_eq!(loaded, doc);
    }

    #[test]
    fn test_save_creates_data_dir() {
        let temp = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp.path().join("nested").join("dir"));
        storage.save(&Document::new()).unwrap();
        assert!(storage.load().unwrap().is_some());
    }

    #[test]
    fn test_corrupt_file_is_decode_error() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(DATA_FILE_NAME), b"{{{").unwrap();

        let storage = LocalStorage::new(temp.path());
        let result = storage.load();
        assert!(matches!(result, Err(StorageError::Json(_, _))));
    }
}
