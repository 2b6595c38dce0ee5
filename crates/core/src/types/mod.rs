//! Core types for Go Marketplace.
//!
//! This module provides type-safe wrappers for the cart domain.

pub mod cart;
pub mod id;
pub mod price;

pub use cart::{Cart, CartItem, CartSummary, InvalidCart, ItemNotFound, NewCartItem};
pub use id::ProductId;
pub use price::Price;
