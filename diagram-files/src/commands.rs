use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Subcommand;
use diagram_files_core::{FileManager, KeyValueStore, SourceModule};
use parking_lot::RwLock;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List stored files
    List,

    /// Create an empty file under the next free default name
    New,

    /// Print the source text of a file
    Show { name: String },

    /// Import a JSON file with `source` and optional `chart` fields
    Import {
        path: PathBuf,

        /// Name to store it under (defaults to the file stem)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Write a stored file as JSON
    Export {
        name: String,

        /// Output path (defaults to stdout)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Rename a stored file
    Rename { from: String, to: String },

    /// Delete a stored file
    Delete { name: String },
}

/// Run one command and return the lines it prints.
pub async fn run<S: KeyValueStore>(
    command: Commands,
    manager: &FileManager<S>,
    source: &Arc<RwLock<SourceModule>>,
) -> Result<Vec<String>> {
    let mut output = Vec::new();
    match command {
        Commands::List => {
            manager.list_files().await?;
            output.extend(manager.files());
        }
        Commands::New => {
            // default names come from the cached listing
            manager.list_files().await?;
            output.push(manager.new_file().await?);
        }
        Commands::Show { name } => {
            if !manager.open_file(&name).await? {
                anyhow::bail!("no file named {:?}", name);
            }
            output.push(source.read().source().to_string());
        }
        Commands::Import { path, name } => {
            let content = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("reading {}", path.display()))?;
            let name = match name {
                Some(name) => name,
                None => path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .context("cannot derive a file name from the path; pass --name")?
                    .to_string(),
            };
            manager.load_file_from_upload(&content, &name).await?;
            output.push(name);
        }
        Commands::Export { name, out } => {
            let json = manager.export_file(&name).await?;
            match out {
                Some(path) => tokio::fs::write(&path, json)
                    .await
                    .with_context(|| format!("writing {}", path.display()))?,
                None => output.push(json),
            }
        }
        Commands::Rename { from, to } => {
            if !manager.open_file(&from).await? {
                anyhow::bail!("no file named {:?}", from);
            }
            manager.rename_file(&to).await?;
            output.push(to);
        }
        Commands::Delete { name } => {
            manager.delete_file(Some(name.as_str())).await?;
        }
    }
    Ok(output)
}
