//! Integration tests for Go Marketplace.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p go-marketplace-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_scenarios` - Quantity transitions as seen by cart consumers
//! - `cart_persistence` - Hydration, write-through and write ordering
//! - `cart_scope` - Scoped access through `CartProvider`
//!
//! This library holds the fixtures those tests share.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use go_marketplace_cart::{CartConfig, CartManager, KeyValueStore, MemoryStore, StoreError};
use go_marketplace_core::{NewCartItem, Price, ProductId};
use tokio::sync::Mutex;

/// A product as the catalogue would hand it to `add_to_cart`.
#[must_use]
pub fn product(id: &str, title: &str, price: Price) -> NewCartItem {
    NewCartItem {
        id: ProductId::new(id),
        title: title.to_string(),
        image_url: format!("https://cdn.example.com/{id}.png"),
        price,
    }
}

/// Open a manager over `store` with the default configuration.
pub async fn open_cart(store: Arc<dyn KeyValueStore>) -> CartManager {
    CartManager::open(store, &CartConfig::default()).await
}

/// Open a manager over a fresh memory store and return both.
pub async fn open_memory_cart() -> (CartManager, MemoryStore) {
    let store = MemoryStore::new();
    let cart = open_cart(Arc::new(store.clone())).await;
    (cart, store)
}

/// Store whose writes get faster over time and which records the order in
/// which writes complete.
///
/// The first write sleeps longest, so any writer that let writes overlap
/// would finish them out of order.
#[derive(Debug, Default)]
pub struct SlowStore {
    inner: MemoryStore,
    pending_delay_ms: Mutex<u64>,
    completed: Mutex<Vec<String>>,
}

impl SlowStore {
    /// Create a store whose first write takes `first_delay_ms`.
    #[must_use]
    pub fn new(first_delay_ms: u64) -> Self {
        Self {
            pending_delay_ms: Mutex::new(first_delay_ms),
            ..Self::default()
        }
    }

    /// Values in the order their writes completed.
    pub async fn completed(&self) -> Vec<String> {
        self.completed.lock().await.clone()
    }
}

#[async_trait]
impl KeyValueStore for SlowStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        let delay = {
            let mut pending = self.pending_delay_ms.lock().await;
            let delay = *pending;
            *pending = pending.saturating_sub(10);
            delay
        };
        tokio::time::sleep(Duration::from_millis(delay)).await;

        self.inner.set(key, value.clone()).await?;
        self.completed.lock().await.push(value);
        Ok(())
    }
}
