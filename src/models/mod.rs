pub mod document;
pub mod log_entry;
pub mod plan;

pub use document::Document;
pub use log_entry::{LogEntry, LogKey};
pub use plan::Plan;
