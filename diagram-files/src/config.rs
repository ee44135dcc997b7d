use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use diagram_files_core::storage::folder::{DEFAULT_NAMESPACE, DEFAULT_STORE_NAME};
use diagram_files_core::FolderStore;

/// Where the file store lives on disk.
#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    /// Root directory for stored files
    #[arg(long, env = "DIAGRAM_FILES_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Store namespace under the root directory
    #[arg(long, default_value = DEFAULT_NAMESPACE)]
    pub namespace: String,

    /// Store name within the namespace
    #[arg(long, default_value = DEFAULT_STORE_NAME)]
    pub store_name: String,
}

impl StoreArgs {
    /// Open (creating if needed) the configured store.
    pub async fn open_store(&self) -> Result<FolderStore> {
        FolderStore::open(&self.data_dir, &self.namespace, &self.store_name).await
    }
}
