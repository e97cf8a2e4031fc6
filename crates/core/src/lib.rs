//! ProShop Core - Shared types and the cart pricing engine.
//!
//! This crate provides the common types used across all ProShop components:
//! - `server` - REST backend (users, products, orders)
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains types and pure business rules. The only I/O it
//! performs is the cart snapshot slot, which mirrors the browser-local
//! key-value storage the cart is persisted to between sessions.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe ids and emails
//! - [`cart`] - Cart state container, reducer, and price derivation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use types::*;
