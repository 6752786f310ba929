//! Blob store collaborators: where the remote copy of the document lives.
//!
//! The store is an opaque byte-keyed blob interface; it never parses or
//! merges documents. Consistency is the reconciler's job.

use std::collections::HashMap;
use std::sync::RwLock;

/// Errors from a document store.
#[derive(Debug)]
pub enum StoreError {
    /// Failed to reach the store at all.
    Connection(String),
    /// The store answered with an unexpected status or payload.
    Remote(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Connection(e) => write!(f, "Connection error: {}", e),
            StoreError::Remote(e) => write!(f, "Store error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

/// An opaque blob store keyed by document id.
///
/// `fetch` returns `None` when the document does not exist; callers treat
/// that the same as an empty document.
pub trait DocumentStore {
    fn fetch(
        &self,
        document_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Vec<u8>>, StoreError>> + Send;

    fn write(
        &self,
        document_id: &str,
        bytes: &[u8],
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}

/// HTTP-backed store talking to a liftlog-server instance.
pub struct RemoteStore {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl RemoteStore {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    fn document_url(&self, document_id: &str) -> String {
        format!(
            "{}/documents/{}",
            self.base_url.trim_end_matches('/'),
            document_id
        )
    }

    /// Pings the server's health endpoint.
    pub async fn health(&self) -> Result<String, StoreError> {
        #[derive(serde::Deserialize)]
        struct Health {
            status: String,
        }

        let url = format!("{}/health", self.base_url.trim_end_matches('/'));
        let health: Health = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?
            .json()
            .await
            .map_err(|e| StoreError::Remote(e.to_string()))?;
        Ok(health.status)
    }
}

impl DocumentStore for RemoteStore {
    async fn fetch(&self, document_id: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let response = self
            .client
            .get(self.document_url(document_id))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(StoreError::Remote(format!(
                "GET returned {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| StoreError::Remote(e.to_string()))?;
        Ok(Some(bytes.to_vec()))
    }

    async fn write(&self, document_id: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let response = self
            .client
            .put(self.document_url(document_id))
            .bearer_auth(&self.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StoreError::Remote(format!(
                "PUT returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}

/// In-process store used by tests. Shares one map across clones so two
/// sessions can sync against the same "remote".
#[derive(Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents held.
    pub fn len(&self) -> usize {
        self.documents.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DocumentStore for MemoryStore {
    async fn fetch(&self, document_id: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.documents.read().unwrap().get(document_id).cloned())
    }

    async fn write(&self, document_id: &str, bytes: &[u8]) -> Result<(), StoreError> {
        self.documents
            .write()
            .unwrap()
            .insert(document_id.to_string(), bytes.to_vec());
        Ok(())
    }
}
