//! ReLocal storefront library.
//!
//! The storefront functionality as a library, so routes and checkout
//! logic can be tested without the binary.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart_store;
pub mod checkout;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
