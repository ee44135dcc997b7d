//! Command-line front end for the diagram file store.

use anyhow::Result;
use clap::Parser;
use diagram_files_core::modules::shared;
use diagram_files_core::{ChartModule, FileManager, SourceModule};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::Commands;
use config::StoreArgs;

#[derive(Parser)]
#[command(name = "diagram-files")]
#[command(about = "Manage locally stored diagram files")]
struct Cli {
    #[command(flatten)]
    store: StoreArgs,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let store = cli.store.open_store().await?;
    info!("using store at {}", store.data_dir().display());

    let source = shared(SourceModule::default());
    let chart = shared(ChartModule::default());
    let manager = FileManager::new(store, source.clone(), chart);

    for line in commands::run(cli.command, &manager, &source).await? {
        println!("{}", line);
    }
    Ok(())
}
