use clap::{Parser, Subcommand};
use std::path::PathBuf;

use liftlog::commands::{ConfigCommand, LogCommand, PlanCommand, SyncCommand};
use liftlog::config::Config;
use liftlog::sync::LocalStorage;

#[derive(Parser)]
#[command(name = "liftlog")]
#[command(version)]
#[command(about = "A workout tracking CLI with multi-device sync", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage workout plans
    Plan(PlanCommand),

    /// Record and review logged sets
    Log(LogCommand),

    /// Sync with the remote document store
    Sync(SyncCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "liftlog=warn".into()),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config)?;

    match cli.command {
        Some(Commands::Plan(cmd)) => {
            let storage = LocalStorage::new(&config.data_dir);
            cmd.run(&storage)?;
        }
        Some(Commands::Log(cmd)) => {
            let storage = LocalStorage::new(&config.data_dir);
            cmd.run(&storage)?;
        }
        Some(Commands::Sync(cmd)) => {
            cmd.run(&config).await?;
        }
        Some(Commands::Config(cmd)) => {
            cmd.run(&config)?;
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}
