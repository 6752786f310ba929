//! One device's view of the document, and the sync entry point.
//!
//! The in-memory document lives in an explicit `Session` handle passed to
//! whoever needs it; there is no ambient shared state. A sync round is
//! triggered explicitly and either completes or fails; the caller retries
//! manually.

use crate::models::Document;
use crate::sync::merge::merge;
use crate::sync::store::{DocumentStore, StoreError};

/// Errors from a sync round.
///
/// A fetch failure is *not* an error here: the round proceeds against the
/// empty document so local-only progress can still be persisted. Only the
/// write-back surfaces, and by then local state has already advanced, so
/// retrying is safe and idempotent.
#[derive(Debug)]
pub enum SyncError {
    /// Failed to encode the merged document.
    Encode(serde_json::Error),
    /// Failed to write the merged document back to the store. Retryable.
    Write(StoreError),
}

impl std::fmt::Display for SyncError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncError::Encode(e) => write!(f, "Failed to encode document: {}", e),
            SyncError::Write(e) => write!(f, "Failed to write document to store: {}", e),
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncError::Encode(e) => Some(e),
            SyncError::Write(e) => Some(e),
        }
    }
}

/// Result of one sync round.
#[derive(Debug, Clone)]
pub struct SyncReport {
    /// Whether a remote document was found and decoded.
    pub remote_found: bool,
    /// Plan count in the merged document.
    pub plans: usize,
    /// Log entry count in the merged document.
    pub logs: usize,
}

/// A session: the document id plus this device's in-memory copy.
#[derive(Debug, Clone)]
pub struct Session {
    document_id: String,
    document: Document,
}

impl Session {
    pub fn new(document_id: impl Into<String>, document: Document) -> Self {
        Self {
            document_id: document_id.into(),
            document,
        }
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Runs one synchronization round: fetch the remote document, merge
    /// it with the in-memory copy, adopt the merged result locally, and
    /// write it back.
    ///
    /// A missing, unreachable, or undecodable remote is treated as the
    /// empty document. On a write failure the merged document has already
    /// replaced the in-memory copy and is not rolled back.
    pub async fn sync<S: DocumentStore>(&mut self, store: &S) -> Result<SyncReport, SyncError> {
        let (remote, remote_found) = match store.fetch(&self.document_id).await {
            Ok(Some(bytes)) => match Document::from_bytes(&bytes) {
                Ok(doc) => (doc, true),
                Err(e) => {
                    tracing::warn!(
                        document_id = %self.document_id,
                        "Remote document did not decode, syncing against empty: {}",
                        e
                    );
                    (Document::new(), false)
                }
            },
            Ok(None) => (Document::new(), false),
            Err(e) => {
                tracing::warn!(
                    document_id = %self.document_id,
                    "Remote fetch failed, syncing against empty: {}",
                    e
                );
                (Document::new(), false)
            }
        };

        let merged = merge(&self.document, &remote);
        self.document = merged;

        let bytes = self.document.to_bytes().map_err(SyncError::Encode)?;
        store
            .write(&self.document_id, &bytes)
            .await
            .map_err(SyncError::Write)?;

        Ok(SyncReport {
            remote_found,
            plans: self.document.plans.len(),
            logs: self.document.logs.len(),
        })
    }
}
