//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `CART_STORAGE_KEY` - Key the cart is persisted under (default: `@GoMarketplace:products`)
//! - `CART_STORE_PATH` - JSON file backing the file store (default: `go-marketplace.json`)
//! - `CART_EVENT_CAPACITY` - Buffered persistence events per subscriber (default: 64, max: 65536)

use std::path::PathBuf;

use thiserror::Error;

/// Key the cart has always been stored under.
pub const DEFAULT_STORAGE_KEY: &str = "@GoMarketplace:products";

const DEFAULT_STORE_PATH: &str = "go-marketplace.json";
const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Largest accepted persistence event buffer.
pub const MAX_EVENT_CAPACITY: usize = 1 << 16;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart state configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartConfig {
    /// Durable key holding the serialized cart
    pub storage_key: String,
    /// Backing file for [`FileStore`](crate::store::FileStore)
    pub store_path: PathBuf,
    /// Capacity of the persistence event broadcast channel
    pub event_capacity: usize,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let storage_key = get_or_default(&lookup, "CART_STORAGE_KEY", DEFAULT_STORAGE_KEY);
        if storage_key.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "CART_STORAGE_KEY".to_string(),
                "must not be empty".to_string(),
            ));
        }

        let store_path = PathBuf::from(get_or_default(&lookup, "CART_STORE_PATH", DEFAULT_STORE_PATH));

        let event_capacity = match lookup("CART_EVENT_CAPACITY") {
            Some(raw) => parse_capacity(&raw)?,
            None => DEFAULT_EVENT_CAPACITY,
        };

        Ok(Self {
            storage_key,
            store_path,
            event_capacity,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a variable with a default value.
fn get_or_default(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key).unwrap_or_else(|| default.to_string())
}

fn parse_capacity(raw: &str) -> Result<usize, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar("CART_EVENT_CAPACITY".to_string(), reason);

    let capacity = raw.trim().parse::<usize>().map_err(|e| invalid(e.to_string()))?;
    if capacity == 0 {
        return Err(invalid("must be at least 1".to_string()));
    }
    if capacity > MAX_EVENT_CAPACITY {
        return Err(invalid(format!("must be at most {MAX_EVENT_CAPACITY}")));
    }
    Ok(capacity)
}
