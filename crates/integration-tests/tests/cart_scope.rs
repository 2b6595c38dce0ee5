//! Integration tests for scoped cart access.

#![allow(clippy::unwrap_used)]

use go_marketplace_cart::{CartError, CartProvider, use_cart};
use go_marketplace_core::{Price, ProductId};
use go_marketplace_integration_tests::{open_memory_cart, product};

/// A consumer that only knows how to find the cart through its scope.
fn add_button_pressed(id: &str) -> Result<u32, CartError> {
    let cart = use_cart()?;
    Ok(cart.add_to_cart(product(id, "T", Price::from_cents(500))))
}

fn minus_button_pressed(id: &str) -> Result<Option<u32>, CartError> {
    use_cart()?.decrement(&ProductId::new(id))
}

#[test]
fn test_outside_scope_is_not_initialized() {
    assert_eq!(add_button_pressed("p1"), Err(CartError::NotInitialized));
    assert_eq!(minus_button_pressed("p1"), Err(CartError::NotInitialized));
}

#[tokio::test]
async fn test_consumers_share_the_provided_cart() {
    let (cart, _) = open_memory_cart().await;
    let provider = CartProvider::new(cart.clone());

    let quantity = provider
        .scope(async {
            add_button_pressed("p1").unwrap();
            add_button_pressed("p1").unwrap()
        })
        .await;

    assert_eq!(quantity, 2);
    assert_eq!(cart.summary().item_count, 2);
}

#[tokio::test]
async fn test_errors_inside_scope_reach_the_consumer() {
    let (cart, _) = open_memory_cart().await;
    let provider = CartProvider::new(cart);

    let outcome = provider.sync_scope(|| minus_button_pressed("ghost"));
    assert_eq!(outcome, Err(CartError::ItemNotFound(ProductId::new("ghost"))));
}
