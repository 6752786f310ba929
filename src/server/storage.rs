//! Server-side blob storage for user documents.
//!
//! Documents are stored per user in the following structure:
//! ```text
//! <DATA_DIR>/
//!   <user_id>/
//!     <document_id>.json
//! ```
//!
//! Blobs are opaque to the server; it never parses or merges them.
//! Reconciliation happens on the client.

use std::fs;
use std::io;
use std::path::PathBuf;

/// Errors that can occur during server storage operations.
#[derive(Debug)]
pub enum BlobStorageError {
    /// I/O error reading or writing a file.
    Io(PathBuf, io::Error),
    /// Invalid user or document id (e.g., contains path separators).
    InvalidId(String),
}

impl std::fmt::Display for BlobStorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlobStorageError::Io(path, e) => {
                write!(f, "I/O error for {}: {}", path.display(), e)
            }
            BlobStorageError::InvalidId(id) => {
                write!(f, "Invalid id: {}", id)
            }
        }
    }
}

impl std::error::Error for BlobStorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BlobStorageError::Io(_, e) => Some(e),
            _ => None,
        }
    }
}

/// Per-user blob storage rooted at a data directory.
#[derive(Debug, Clone)]
pub struct BlobStorage {
    data_dir: PathBuf,
}

impl BlobStorage {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Validates an id to prevent path traversal.
    fn validate_id(id: &str) -> Result<(), BlobStorageError> {
        if id.is_empty()
            || id.contains('/')
            || id.contains('\\')
            || id.contains("..")
            || id.starts_with('.')
        {
            return Err(BlobStorageError::InvalidId(id.to_string()));
        }
        Ok(())
    }

    fn document_path(
        &self,
        user_id: &str,
        document_id: &str,
    ) -> Result<PathBuf, BlobStorageError> {
        Self::validate_id(user_id)?;
        Self::validate_id(document_id)?;
        Ok(self
            .data_dir
            .join(user_id)
            .join(format!("{}.json", document_id)))
    }

    /// Loads a document blob, or `None` if it does not exist.
    pub fn load(
        &self,
        user_id: &str,
        document_id: &str,
    ) -> Result<Option<Vec<u8>>, BlobStorageError> {
        let path = self.document_path(user_id, document_id)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BlobStorageError::Io(path, e)),
        }
    }

    /// Saves a document blob atomically, creating the user directory on
    /// first write.
    pub fn save(
        &self,
        user_id: &str,
        document_id: &str,
        bytes: &[u8],
    ) -> Result<(), BlobStorageError> {
        let path = self.document_path(user_id, document_id)?;
        let dir = self.data_dir.join(user_id);
        fs::create_dir_all(&dir).map_err(|e| BlobStorageError::Io(dir, e))?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, bytes).map_err(|e| BlobStorageError::Io(tmp.clone(), e))?;
        fs::rename(&tmp, &path).map_err(|e| BlobStorageError::Io(path, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_is_none() {
        let temp = TempDir::new().unwrap();
        let storage = BlobStorage::new(temp.path());
        assert!(storage.load("user1", "doc1").unwrap().is_none());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let storage = BlobStorage::new(temp.path());

        storage.save("user1", "doc1", b"{\"plans\":{}}").unwrap();
        let bytes = storage.load("user1", "doc1").unwrap().unwrap();
        assert_eq!(bytes, b"{\"plans\":{}}");
    }

    #[test]
    fn test_save_overwrites() {
        let temp = TempDir::new().unwrap();
        let storage = BlobStorage::new(temp.path());

        storage.save("user1", "doc1", b"old").unwrap();
        storage.save("user1", "doc1", b"new").unwrap();
        assert_eq!(storage.load("user1", "doc1").unwrap().unwrap(), b"new");
    }

    #[test]
    fn test_users_are_isolated() {
        let temp = TempDir::new().unwrap();
        let storage = BlobStorage::new(temp.path());

        storage.save("alice", "doc1", b"alice-data").unwrap();
        assert!(storage.load("bob", "doc1").unwrap().is_none());
    }

    #[test]
    fn test_invalid_ids_rejected() {
        let temp = TempDir::new().unwrap();
        let storage = BlobStorage::new(temp.path());

        for bad in ["", "../escape", "a/b", ".hidden", "a\\b"] {
            assert!(matches!(
                storage.load("user1", bad),
                Err(BlobStorageError::InvalidId(_))
            ));
            assert!(matches!(
                storage.load(bad, "doc1"),
                Err(BlobStorageError::InvalidId(_))
            ));
        }
    }
}
