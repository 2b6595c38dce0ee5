//! CLI subcommands and shared setup.

pub mod cart;

use std::path::PathBuf;
use std::sync::Arc;

use go_marketplace_cart::{CartConfig, CartError, CartManager, ConfigError, FileStore, Hydration};
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The cart rejected the operation.
    #[error("{0}")]
    Cart(#[from] CartError),

    /// The change was applied in memory but could not be saved.
    #[error("Failed to save cart: {0}")]
    Persistence(String),
}

/// Load configuration from the environment, applying CLI overrides.
///
/// # Errors
///
/// Returns `ConfigError` if an environment variable is invalid.
pub fn load_config(store: Option<PathBuf>, key: Option<String>) -> Result<CartConfig, ConfigError> {
    let mut config = CartConfig::from_env()?;
    if let Some(store) = store {
        config.store_path = store;
    }
    if let Some(key) = key {
        config.storage_key = key;
    }
    Ok(config)
}

/// Open the file-backed cart described by `config`.
pub async fn open(config: &CartConfig) -> CartManager {
    let store = Arc::new(FileStore::new(&config.store_path));
    let cart = CartManager::open(store, config).await;

    match cart.hydration() {
        Hydration::Discarded(e) => warn!(
            path = %config.store_path.display(),
            error = %e,
            "Stored cart could not be loaded, starting empty"
        ),
        Hydration::Restored { items } => {
            info!(path = %config.store_path.display(), items, "Cart loaded");
        }
        Hydration::Empty => {}
    }
    cart
}
