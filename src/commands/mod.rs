pub mod config_cmd;
pub mod log;
pub mod plan;
pub mod sync_cmd;

pub use config_cmd::ConfigCommand;
pub use log::LogCommand;
pub use plan::PlanCommand;
pub use sync_cmd::SyncCommand;

/// First few characters of an api key for display. Truncates on
/// characters, not bytes, so multibyte keys print instead of panicking.
pub(crate) fn key_preview(key: &str) -> String {
    key.chars().take(8).collect()
}
