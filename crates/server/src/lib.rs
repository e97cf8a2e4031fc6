//! ProShop server library.
//!
//! Exposes the application modules and the router builder so integration
//! tests can drive the full HTTP surface without binding a socket.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

pub use routes::app;
