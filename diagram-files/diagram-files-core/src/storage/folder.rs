//! Directory-backed store: one JSON file per key.
//!
//! Files live under `<root>/<namespace>/<store name>/`. The file stem is the
//! URL-safe base64 of the key, so names with spaces, parentheses or slashes
//! all map to valid file names. Keys longer than [`MAX_KEY_BYTES`] are
//! rejected with [`KeyTooLong`], since their stems would not fit in a file
//! name.
//!
//! Each write goes to its own temporary file that is then renamed over the
//! target, so a single record is never half written and overlapping writes to
//! one key resolve to whichever rename lands last.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde_json::Value;
use tokio::fs;

use super::{KeyTooLong, KeyValueStore};

pub const DEFAULT_NAMESPACE: &str = "dbdiagram-oss";
pub const DEFAULT_STORE_NAME: &str = "files";

const RECORD_EXTENSION: &str = "json";
const TEMP_PREFIX: &str = ".tmp";

/// Longest key whose encoded stem plus extension stays under the common
/// 255-byte file name limit.
pub const MAX_KEY_BYTES: usize = 180;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

pub struct FolderStore {
    dir: PathBuf,
}

impl FolderStore {
    /// Open (creating if needed) the store `namespace/store_name` under `root`.
    pub async fn open(root: impl AsRef<Path>, namespace: &str, store_name: &str) -> Result<Self> {
        Self::new(root.as_ref().join(namespace).join(store_name)).await
    }

    /// Open a store rooted directly at `dir`.
    pub async fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("creating store directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    /// Directory where records are persisted.
    pub fn data_dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", encode_key(key), RECORD_EXTENSION))
    }

    /// Fresh temporary path, unique per write within and across processes.
    fn temp_path(&self) -> PathBuf {
        let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        self.dir
            .join(format!("{}-{}-{}", TEMP_PREFIX, std::process::id(), n))
    }
}

fn encode_key(key: &str) -> String {
    URL_SAFE_NO_PAD.encode(key.as_bytes())
}

fn decode_key(stem: &str) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(stem).ok()?;
    String::from_utf8(bytes).ok()
}

#[async_trait]
impl KeyValueStore for FolderStore {
    async fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(keys),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            // stray files that were not written by this store are skipped
            if let Some(key) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(decode_key)
            {
                keys.push(key);
            }
        }

        keys.sort();
        Ok(keys)
    }

    async fn get_item(&self, key: &str) -> Result<Option<Value>> {
        if key.len() > MAX_KEY_BYTES {
            return Ok(None);
        }
        let path = self.path(key);
        let data = match fs::read_to_string(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let value = serde_json::from_str(&data)
            .with_context(|| format!("corrupt record at {}", path.display()))?;
        Ok(Some(value))
    }

    async fn set_item(&self, key: &str, value: Value) -> Result<()> {
        if key.is_empty() {
            return Err(anyhow!("empty key"));
        }
        if key.len() > MAX_KEY_BYTES {
            return Err(KeyTooLong {
                len: key.len(),
                max: MAX_KEY_BYTES,
            }
            .into());
        }
        let path = self.path(key);
        let tmp = self.temp_path();
        let data = serde_json::to_vec(&value)?;
        fs::write(&tmp, data).await?;
        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        if key.len() > MAX_KEY_BYTES {
            return Ok(());
        }
        match fs::remove_file(self.path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
