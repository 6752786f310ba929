//! Sync CLI commands for synchronizing with the remote document store.

use clap::{Args, Subcommand};

use crate::config::Config;
use crate::sync::{
    CredentialCache, CredentialError, LocalStorage, RemoteStore, Session, StorageError, SyncError,
};

/// Sync with the remote document store
#[derive(Debug, Args)]
pub struct SyncCommand {
    #[command(subcommand)]
    command: Option<SyncSubcommand>,
}

#[derive(Debug, Subcommand)]
enum SyncSubcommand {
    /// Show sync configuration and server status
    Status,
}

impl SyncCommand {
    pub async fn run(&self, config: &Config) -> Result<(), SyncCommandError> {
        match &self.command {
            None => self.sync(config).await,
            Some(SyncSubcommand::Status) => self.status(config).await,
        }
    }

    async fn sync(&self, config: &Config) -> Result<(), SyncCommandError> {
        let server_url = config
            .sync
            .server_url
            .clone()
            .ok_or(SyncCommandError::NotConfigured)?;
        let document_id = config
            .sync
            .document_id
            .clone()
            .ok_or(SyncCommandError::NotConfigured)?;

        // A configured key wins; otherwise fall back to the key this
        // device cached on an earlier run.
        let cache = CredentialCache::new(&config.data_dir);
        let api_key = match &config.sync.api_key {
            Some(key) => {
                cache.put(&document_id, key.as_bytes())?;
                key.clone()
            }
            None => match cache.get(&document_id)? {
                Some(bytes) => String::from_utf8(bytes)
                    .map_err(|_| SyncCommandError::NotConfigured)?,
                None => return Err(SyncCommandError::NotConfigured),
            },
        };

        let storage = LocalStorage::new(&config.data_dir);
        let mut session = Session::new(&document_id, storage.load_or_default()?);
        let store = RemoteStore::new(server_url, api_key);

        println!("Syncing with server...");

        let report = session.sync(&store).await;

        // The merged document is this device's state now, even when the
        // push failed; persist before reporting so a retry starts from it.
        storage.save(session.document())?;

        let report = report?;
        println!();
        if report.remote_found {
            println!("  ✓ merged with remote document");
        } else {
            println!("  ✓ no remote document yet, pushed local state");
        }
        println!("  {} plan(s), {} log entr(ies)", report.plans, report.logs);
        println!();
        println!("Sync complete.");

        Ok(())
    }

    async fn status(&self, config: &Config) -> Result<(), SyncCommandError> {
        println!("Sync Configuration");
        println!("==================");
        println!();

        if !config.sync.is_configured() {
            println!("Status: Not configured");
            println!();
            println!("To enable sync, add to your config file:");
            println!();
            println!("  sync:");
            println!("    server_url: \"http://localhost:8080\"");
            println!("    api_key: \"your-api-key\"");
            println!("    document_id: \"your-document-id\"");
            println!();
            println!("Or set environment variables:");
            println!("  LIFTLOG_SYNC_URL");
            println!("  LIFTLOG_SYNC_API_KEY");
            println!("  LIFTLOG_DOCUMENT_ID");
            return Ok(());
        }

        let server_url = config.sync.server_url.as_deref().unwrap_or_default();
        let api_key = config.sync.api_key.as_deref().unwrap_or_default();
        let document_id = config.sync.document_id.as_deref().unwrap_or_default();

        println!("Server:   {}", server_url);
        println!("API Key:  {}...", super::key_preview(api_key));
        println!("Document: {}", document_id);
        println!();

        print!("Server status: ");
        let store = RemoteStore::new(server_url, api_key);
        match store.health().await {
            Ok(status) => println!("✓ {}", status),
            Err(e) => println!("✗ {}", e),
        }

        Ok(())
    }
}

/// Errors from sync commands
#[derive(Debug)]
pub enum SyncCommandError {
    NotConfigured,
    Storage(StorageError),
    Credentials(CredentialError),
    Sync(SyncError),
}

impl std::fmt::Display for SyncCommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncCommandError::NotConfigured => write!(
                f,
                "Sync not configured. Add server_url, api_key and document_id to config."
            ),
            SyncCommandError::Storage(e) => write!(f, "Storage error: {}", e),
            SyncCommandError::Credentials(e) => write!(f, "Credential cache error: {}", e),
            SyncCommandError::Sync(e) => write!(f, "Sync error: {}", e),
        }
    }
}

impl std::error::Error for SyncCommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncCommandError::NotConfigured => None,
            SyncCommandError::Storage(e) => Some(e),
            SyncCommandError::Credentials(e) => Some(e),
            SyncCommandError::Sync(e) => Some(e),
        }
    }
}

impl From<StorageError> for SyncCommandError {
    fn from(e: StorageError) -> Self {
        SyncCommandError::Storage(e)
    }
}

impl From<CredentialError> for SyncCommandError {
    fn from(e: CredentialError) -> Self {
        SyncCommandError::Credentials(e)
    }
}

impl From<SyncError> for SyncCommandError {
    fn from(e: SyncError) -> Self {
        SyncCommandError::Sync(e)
    }
}
