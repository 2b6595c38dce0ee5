//! Cart commands.
//!
//! Mutating commands wait for the write to land before returning, and fail if
//! the store rejected it.

use go_marketplace_cart::{CartManager, PersistenceEvent};
use go_marketplace_core::{NewCartItem, Price, ProductId};
use tokio::sync::broadcast;
use tracing::info;

use super::CommandError;

/// Print every cart line.
#[allow(clippy::print_stdout)]
pub fn list(cart: &CartManager) {
    let products = cart.products();
    if products.is_empty() {
        println!("Cart is empty");
        return;
    }

    for item in &products {
        println!(
            "{:<16} {:>4} x {:>10} = {:>10}  {}",
            item.id,
            item.quantity,
            item.price.to_string(),
            item.line_total().to_string(),
            item.title
        );
    }
}

/// Print the item count and total price.
#[allow(clippy::print_stdout)]
pub fn summary(cart: &CartManager) {
    let summary = cart.summary();
    println!("{} items, total {}", summary.item_count, summary.total);
}

/// Add one unit of a product.
///
/// # Errors
///
/// Returns `CommandError::Persistence` if the cart could not be saved.
pub async fn add(
    cart: &CartManager,
    id: String,
    title: String,
    image_url: String,
    price: Price,
) -> Result<(), CommandError> {
    let id = ProductId::new(id);
    let quantity = persist(cart, |cart| {
        cart.add_to_cart(NewCartItem {
            id: id.clone(),
            title,
            image_url,
            price,
        })
    })
    .await?;

    info!(product_id = %id, quantity, "Added to cart");
    Ok(())
}

/// Increment a line. Unknown products are left alone.
///
/// # Errors
///
/// Returns `CommandError::Persistence` if the cart could not be saved.
pub async fn increment(cart: &CartManager, id: String) -> Result<(), CommandError> {
    let id = ProductId::new(id);
    match persist(cart, |cart| cart.increment(&id)).await? {
        Some(quantity) => info!(product_id = %id, quantity, "Incremented"),
        None => info!(product_id = %id, "Not in cart, nothing to increment"),
    }
    Ok(())
}

/// Decrement a line, removing it at zero.
///
/// # Errors
///
/// Returns `CommandError::Cart` if the product is not in the cart, or
/// `CommandError::Persistence` if the cart could not be saved.
pub async fn decrement(cart: &CartManager, id: String) -> Result<(), CommandError> {
    let id = ProductId::new(id);
    match persist(cart, |cart| cart.decrement(&id)).await?? {
        Some(quantity) => info!(product_id = %id, quantity, "Decremented"),
        None => info!(product_id = %id, "Removed from cart"),
    }
    Ok(())
}

/// Remove every line.
///
/// # Errors
///
/// Returns `CommandError::Persistence` if the cart could not be saved.
pub async fn clear(cart: &CartManager) -> Result<(), CommandError> {
    persist(cart, CartManager::clear).await?;
    info!("Cart cleared");
    Ok(())
}

/// Run `op`, wait for its writes, and surface any write failure.
async fn persist<T>(cart: &CartManager, op: impl FnOnce(&CartManager) -> T) -> Result<T, CommandError> {
    let mut events = cart.persistence_events();
    let output = op(cart);
    cart.flush().await;

    loop {
        match events.try_recv() {
            Ok(PersistenceEvent::WriteFailed { error, .. }) => {
                return Err(CommandError::Persistence(error.to_string()));
            }
            Ok(PersistenceEvent::Written { .. }) | Err(broadcast::error::TryRecvError::Lagged(_)) => {}
            Err(broadcast::error::TryRecvError::Empty | broadcast::error::TryRecvError::Closed) => {
                return Ok(output);
            }
        }
    }
}
