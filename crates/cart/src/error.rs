//! Error types for cart state and persistence.
//!
//! [`CartError`] is what callers of the manager see. [`PersistenceError`]
//! never reaches a mutator's caller: writes happen in the background and their
//! failures are logged and broadcast as
//! [`PersistenceEvent`](crate::PersistenceEvent)s instead.

use go_marketplace_core::{InvalidCart, ItemNotFound, ProductId};
use thiserror::Error;

use crate::store::StoreError;

/// Errors returned by cart operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// The cart was used outside of a [`CartProvider`](crate::CartProvider) scope.
    #[error("use_cart must be used within a CartProvider scope")]
    NotInitialized,

    /// Decrement was called for a product that is not in the cart.
    #[error("product {0} is not in the cart")]
    ItemNotFound(ProductId),
}

impl From<ItemNotFound> for CartError {
    fn from(err: ItemNotFound) -> Self {
        Self::ItemNotFound(err.0)
    }
}

/// Failure reading or writing the persisted cart.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The store could not be read.
    #[error("failed to read cart: {0}")]
    Read(#[source] StoreError),

    /// The store rejected a write.
    #[error("failed to write cart: {0}")]
    Write(#[source] StoreError),

    /// The stored value is not a cart.
    #[error("stored cart is malformed: {0}")]
    Decode(#[source] serde_json::Error),

    /// The cart could not be serialized.
    #[error("failed to serialize cart: {0}")]
    Encode(#[source] serde_json::Error),

    /// The stored value parsed but breaks a cart invariant.
    #[error("stored cart is invalid: {0}")]
    Invalid(#[from] InvalidCart),
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_error_display() {
        let err = CartError::ItemNotFound(ProductId::new("p1"));
        assert_eq!(err.to_string(), "product p1 is not in the cart");

        assert_eq!(
            CartError::NotInitialized.to_string(),
            "use_cart must be used within a CartProvider scope"
        );
    }

    #[test]
    fn test_item_not_found_conversion() {
        let err: CartError = ItemNotFound(ProductId::new("p2")).into();
        assert_eq!(err, CartError::ItemNotFound(ProductId::new("p2")));
    }

    #[test]
    fn test_persistence_error_display() {
        let err = PersistenceError::Write(StoreError::Unavailable("disk full".to_string()));
        assert_eq!(err.to_string(), "failed to write cart: store unavailable: disk full");

        let err = PersistenceError::from(InvalidCart::ZeroQuantity(ProductId::new("p1")));
        assert_eq!(
            err.to_string(),
            "stored cart is invalid: cart line for product p1 has zero quantity"
        );
    }
}
