//! Key-value storage for file records.
//!
//! Keys are file names, values are JSON records. Stores make no promises
//! across calls: there are no transactions and no locking, and key
//! enumeration order is whatever the backend produces.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub mod folder;
pub mod memory;


/// A key the backend cannot represent because it is too long.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("key is {len} bytes, the store accepts at most {max}")]
pub struct KeyTooLong {
    pub len: usize,
    pub max: usize,
}

/// Trait for record storage backends
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// List every stored key.
    async fn keys(&self) -> Result<Vec<String>>;

    async fn get_item(&self, key: &str) -> Result<Option<Value>>;

    /// Insert or overwrite.
    async fn set_item(&self, key: &str, value: Value) -> Result<()>;

    /// Remove a key. Removing a missing key succeeds.
    async fn remove_item(&self, key: &str) -> Result<()>;
}

#[async_trait]
impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    async fn keys(&self) -> Result<Vec<String>> {
        (**self).keys().await
    }

    async fn get_item(&self, key: &str) -> Result<Option<Value>> {
        (**self).get_item(key).await
    }

    async fn set_item(&self, key: &str, value: Value) -> Result<()> {
        (**self).set_item(key, value).await
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        (**self).remove_item(key).await
    }
}
