//! Go Marketplace Cart - Persisted, observable shopping cart state.
//!
//! # Architecture
//!
//! - [`CartManager`] owns the in-memory cart and is the only way to change it
//! - Every change is written through to a [`KeyValueStore`] by a single
//!   background writer, in the order the changes happened
//! - The persisted cart is loaded once, in [`CartManager::open`], before any
//!   change can be made
//! - [`CartProvider`] / [`use_cart`] give scoped access for code that cannot
//!   take the manager as an argument
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use go_marketplace_cart::{CartConfig, CartManager, FileStore};
//! use go_marketplace_core::{NewCartItem, Price, ProductId};
//!
//! # async fn run() {
//! let config = CartConfig::default();
//! let store = Arc::new(FileStore::new(&config.store_path));
//! let cart = CartManager::open(store, &config).await;
//!
//! cart.add_to_cart(NewCartItem {
//!     id: ProductId::new("p1"),
//!     title: "Backpack".to_string(),
//!     image_url: "https://cdn.example.com/p1.png".to_string(),
//!     price: Price::from_cents(4990),
//! });
//! cart.flush().await;
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod manager;
pub mod persistence;
pub mod provider;
pub mod store;

pub use config::{CartConfig, ConfigError, DEFAULT_STORAGE_KEY, MAX_EVENT_CAPACITY};
pub use error::{CartError, PersistenceError};
pub use manager::CartManager;
pub use persistence::{Hydration, PersistenceEvent, decode_cart, encode_cart};
pub use provider::{CartProvider, use_cart};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
