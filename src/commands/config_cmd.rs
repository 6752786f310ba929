use clap::{Args, Subcommand};
use uuid::Uuid;

use crate::config::Config;

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show the resolved configuration
    Show,

    /// Print the config file path
    Path,

    /// Write a starter config file with a fresh document id
    Init,
}

impl ConfigCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show => {
                println!("data_dir: {}", config.data_dir.display());
                println!(
                    "sync.server_url: {}",
                    config.sync.server_url.as_deref().unwrap_or("(not set)")
                );
                match &config.sync.api_key {
                    Some(key) => println!("sync.api_key: {}...", super::key_preview(key)),
                    None => println!("sync.api_key: (not set)"),
                }
                println!(
                    "sync.document_id: {}",
                    config.sync.document_id.as_deref().unwrap_or("(not set)")
                );
                Ok(())
            }

            ConfigSubcommand::Path => {
                println!("{}", Config::default_config_path().display());
                Ok(())
            }

            ConfigSubcommand::Init => {
                let path = Config::default_config_path();
                if path.exists() {
                    return Err(format!(
                        "Config file already exists: {}",
                        path.display()
                    )
                    .into());
                }
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }

                let document_id = Uuid::new_v4();
                let contents = format!(
                    "data_dir: {}\nsync:\n  server_url: \"http://localhost:8080\"\n  api_key: \"\"\n  document_id: \"{}\"\n",
                    config.data_dir.display(),
                    document_id
                );
                std::fs::write(&path, contents)?;

                println!("Wrote {}", path.display());
                println!("Document id: {}", document_id);
                println!("Fill in api_key to enable sync.");
                Ok(())
            }
        }
    }
}
