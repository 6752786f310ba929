//! liftlog: a workout tracker whose per-user state is one JSON document
//! in a remote blob store, reconciled across devices by a merge engine.
//!
//! ```
//! use liftlog::models::Document;
//! use liftlog::sync::merge;
//!
//! let merged = merge(&Document::new(), &Document::new());
//! assert!(merged.plans.is_empty());
//! ```

pub mod commands;
pub mod config;
pub mod models;
pub mod server;
pub mod sync;
