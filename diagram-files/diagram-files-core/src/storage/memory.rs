use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::KeyValueStore;

/// In-process store. Keys enumerate in insertion order; overwriting a key
/// keeps its position.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<Vec<(String, Value)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn keys(&self) -> Result<Vec<String>> {
        let entries = self.entries.read().await;
        Ok(entries.iter().map(|(key, _)| key.clone()).collect())
    }

    async fn get_item(&self, key: &str) -> Result<Option<Value>> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value.clone()))
    }

    async fn set_item(&self, key: &str, value: Value) -> Result<()> {
        let mut entries = self.entries.write().await;
        match entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => entries.push((key.to_string(), value)),
        }
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.retain(|(k, _)| k != key);
        Ok(())
    }
}
