//! Synchronization engine: keeps one user's document consistent across
//! independent devices without a central lock or version vector.
//!
//! A session holds an in-memory copy of the document. On an explicit sync
//! it re-fetches the remote copy, merges the two with [`merge::merge`],
//! adopts the result locally, and writes it back. Plans resolve conflicts
//! whole-record last-writer-wins on `updated_at`; logs are an append-only
//! set keyed by `(date, exercise, ts)`.
//!
//! Two devices syncing at the same moment can still race (there is no
//! revision counter); a later sync from either side recovers any log
//! entries that race dropped.

pub mod credentials;
pub mod merge;
pub mod session;
pub mod storage;
pub mod store;

pub use credentials::{CredentialCache, CredentialError};
pub use merge::merge;
pub use session::{Session, SyncError, SyncReport};
pub use storage::{LocalStorage, StorageError};
pub use store::{DocumentStore, MemoryStore, RemoteStore, StoreError};
