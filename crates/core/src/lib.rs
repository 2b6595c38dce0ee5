//! Go Marketplace Core - Shared cart types.
//!
//! This crate provides the types shared by every Go Marketplace component:
//! - `cart` - Cart state manager with write-through persistence
//! - `cli` - Command-line tool for inspecting and editing a stored cart
//!
//! # Architecture
//!
//! The core crate contains only types and the pure cart transition rules - no
//! I/O, no storage, no async runtime. Persistence lives in the `cart` crate.
//!
//! # Modules
//!
//! - [`types`] - Product IDs, prices, cart items and the [`Cart`] collection

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
