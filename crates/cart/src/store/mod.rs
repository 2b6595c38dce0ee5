//! Key-value storage the cart is persisted to.
//!
//! The store is a host-provided collaborator: string keys, string values,
//! asynchronous get/set. The cart only ever touches one key.
//!
//! # Adapters
//!
//! - [`MemoryStore`] - in-process map, for tests and embedding
//! - [`FileStore`] - single JSON file on disk, survives restarts

mod file;
mod memory;

use async_trait::async_trait;
use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Errors returned by a [`KeyValueStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying I/O failed.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing data could not be interpreted as a key-value map.
    #[error("store is corrupt: {0}")]
    Corrupt(String),

    /// The store refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Asynchronous string key-value store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: String) -> Result<(), StoreError>;
}
