//! Server-side pieces of the remote document store.

pub mod storage;

pub use storage::{BlobStorage, BlobStorageError};
