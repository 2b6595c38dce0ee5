//! Scoped access to the cart.
//!
//! Code that cannot take a [`CartManager`] argument can call [`use_cart`]
//! instead, as long as it runs inside [`CartProvider::scope`]. Outside a
//! scope `use_cart` fails with [`CartError::NotInitialized`] rather than
//! handing out an empty cart.
//!
//! The binding is task-local: futures passed to `tokio::spawn` from inside a
//! scope do not inherit it and need their own `scope` call.

use std::future::Future;

use crate::error::{CartError, Result};
use crate::manager::CartManager;

tokio::task_local! {
    static CURRENT_CART: CartManager;
}

/// Makes a [`CartManager`] reachable through [`use_cart`].
#[derive(Debug, Clone)]
pub struct CartProvider {
    manager: CartManager,
}

impl CartProvider {
    #[must_use]
    pub const fn new(manager: CartManager) -> Self {
        Self { manager }
    }

    /// The provided manager.
    #[must_use]
    pub const fn manager(&self) -> &CartManager {
        &self.manager
    }

    /// Run `future` with the cart in scope.
    pub async fn scope<F: Future>(&self, future: F) -> F::Output {
        CURRENT_CART.scope(self.manager.clone(), future).await
    }

    /// Run a synchronous closure with the cart in scope.
    pub fn sync_scope<R>(&self, f: impl FnOnce() -> R) -> R {
        CURRENT_CART.sync_scope(self.manager.clone(), f)
    }
}

/// The cart of the enclosing [`CartProvider`] scope.
///
/// # Errors
///
/// Returns `CartError::NotInitialized` when called outside a scope.
pub fn use_cart() -> Result<CartManager> {
    CURRENT_CART
        .try_with(CartManager::clone)
        .map_err(|_| CartError::NotInitialized)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use go_marketplace_core::{NewCartItem, Price, ProductId};

    use super::*;
    use crate::config::CartConfig;
    use crate::store::MemoryStore;

    async fn provider() -> CartProvider {
        let manager = CartManager::open(Arc::new(MemoryStore::new()), &CartConfig::default()).await;
        CartProvider::new(manager)
    }

    #[tokio::test]
    async fn test_use_cart_outside_scope_fails() {
        assert_eq!(use_cart().unwrap_err(), CartError::NotInitialized);
    }

    #[tokio::test]
    async fn test_use_cart_inside_scope() {
        let provider = provider().await;

        provider
            .scope(async {
                let cart = use_cart().unwrap();
                cart.add_to_cart(NewCartItem {
                    id: ProductId::new("p1"),
                    title: "T".to_string(),
                    image_url: "u".to_string(),
                    price: Price::from_cents(100),
                });
            })
            .await;

        assert_eq!(provider.manager().products().len(), 1);
        assert!(use_cart().is_err());
    }

    #[tokio::test]
    async fn test_sync_scope() {
        let provider = provider().await;
        let count = provider.sync_scope(|| use_cart().map(|cart| cart.products().len()));
        assert_eq!(count, Ok(0));
    }

    #[tokio::test]
    async fn test_spawned_task_does_not_inherit_scope() {
        let provider = provider().await;
        let outcome = provider
            .scope(async { tokio::spawn(async { use_cart().is_ok() }).await.unwrap() })
            .await;
        assert!(!outcome);
    }
}
