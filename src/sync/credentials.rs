//! Local credential cache: lets a previously-authorized device skip
//! re-entering its api key.
//!
//! Secrets are opaque to this module — it stores whatever encrypted bytes
//! the caller hands it, keyed by token, and only answers presence/absence.
//! Plaintext never passes through here.

use base64::{engine::general_purpose::STANDARD, Engine};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

const CACHE_FILE_NAME: &str = "credentials.json";

/// Errors from the credential cache.
#[derive(Debug)]
pub enum CredentialError {
    /// I/O error reading or writing the cache file.
    Io(PathBuf, io::Error),
    /// The cache file exists but does not decode.
    Decode(PathBuf, String),
}

impl std::fmt::Display for CredentialError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialError::Io(path, e) => {
                write!(f, "I/O error for {}: {}", path.display(), e)
            }
            CredentialError::Decode(path, e) => {
                write!(f, "Failed to decode {}: {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for CredentialError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CredentialError::Io(_, e) => Some(e),
            CredentialError::Decode(_, _) => None,
        }
    }
}

/// File-backed token -> secret cache under the data directory. Secret
/// bytes are base64-encoded in the file.
#[derive(Debug, Clone)]
pub struct CredentialCache {
    data_dir: PathBuf,
}

impl CredentialCache {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn cache_path(&self) -> PathBuf {
        self.data_dir.join(CACHE_FILE_NAME)
    }

    fn read_all(&self) -> Result<HashMap<String, String>, CredentialError> {
        let path = self.cache_path();
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(CredentialError::Io(path, e)),
        };
        serde_json::from_str(&contents).map_err(|e| CredentialError::Decode(path, e.to_string()))
    }

    fn write_all(&self, entries: &HashMap<String, String>) -> Result<(), CredentialError> {
        let path = self.cache_path();
        fs::create_dir_all(&self.data_dir).map_err(|e| CredentialError::Io(path.clone(), e))?;
        let contents = serde_json::to_string_pretty(entries)
            .map_err(|e| CredentialError::Decode(path.clone(), e.to_string()))?;

        // Temp file + rename, same as the document stores: a crash
        // mid-write must not corrupt the cache.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, contents).map_err(|e| CredentialError::Io(tmp.clone(), e))?;
        fs::rename(&tmp, &path).map_err(|e| CredentialError::Io(path, e))
    }

    /// Stores a secret under a token, replacing any previous value.
    pub fn put(&self, token: &str, secret: &[u8]) -> Result<(), CredentialError> {
        let mut entries = self.read_all()?;
        entries.insert(token.to_string(), STANDARD.encode(secret));
        self.write_all(&entries)
    }

    /// Looks up the secret for a token, `None` if absent.
    pub fn get(&self, token: &str) -> Result<Option<Vec<u8>>, CredentialError> {
        let entries = self.read_all()?;
        match entries.get(token) {
            Some(encoded) => {
                let path = self.cache_path();
                let bytes = STANDARD
                    .decode(encoded)
                    .map_err(|e| CredentialError::Decode(path, e.to_string()))?;
                Ok(Some(bytes))
            }
            None => Ok(None),
        }
    }

    /// Removes a token's entry. Removing an absent token is a no-op.
    pub fn delete(&self, token: &str) -> Result<(), CredentialError> {
        let mut entries = self.read_all()?;
        if entries.remove(token).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_get_absent_is_none() {
        let temp = TempDir::new().unwrap();
        let cache = CredentialCache::new(temp.path());
        assert!(cache.get("unknown").unwrap().is_none());
    }

    #[test]
    fn test_put_get_roundtrip() {
        let temp = TempDir::new().unwrap();
        let cache = CredentialCache::new(temp.path());

        cache.put("device-1", b"sealed-secret-bytes").unwrap();
        let secret = cache.get("device-1").unwrap().unwrap();
        assert_eq!(secret, b"sealed-secret-bytes");
    }

    #[test]
    fn test_put_replaces_previous_secret() {
        let temp = TempDir::new().unwrap();
        let cache = CredentialCache::new(temp.path());

        cache.put("device-1", b"old").unwrap();
        cache.put("device-1", b"new").unwrap();
        assert_eq!(cache.get("device-1").unwrap().unwrap(), b"new");
    }

    #[test]
    fn test_delete_removes_entry() {
        let temp = TempDir::new().unwrap();
        let cache = CredentialCache::new(temp.path());

        cache.put("device-1", b"secret").unwrap();
        cache.delete("device-1").unwrap();
        assert!(cache.get("device-1").unwrap().is_none());

        // deleting again is fine
        cache.delete("device-1").unwrap();
    }

    #[test]
    fn test_write_leaves_no_temp_file() {
        let temp = TempDir::new().unwrap();
        let cache = CredentialCache::new(temp.path());

        cache.put("device-1", b"secret").unwrap();
        cache.put("device-1", b"rotated").unwrap();

        assert!(temp.path().join("credentials.json").exists());
        assert!(!temp.path().join("credentials.json.tmp").exists());
        assert_eq!(cache.get("device-1").unwrap().unwrap(), b"rotated");
    }

    #[test]
    fn test_entries_are_independent() {
        let temp = TempDir::new().unwrap();
        let cache = CredentialCache::new(temp.path());

        cache.put("a", b"secret-a").unwrap();
        cache.put("b", b"secret-b").unwrap();
        cache.delete("a").unwrap();

        assert!(cache.get("a").unwrap().is_none());
        assert_eq!(cache.get("b").unwrap().unwrap(), b"secret-b");
    }
}
