//! ReLocal Core - Shared types library.
//!
//! This crate provides common types used across ReLocal components:
//! - `storefront` - The traveler-facing marketplace front-end
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! HTTP clients, no session handling. Everything here can be exercised
//! in plain unit tests.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, money, roles, statuses, and addresses
//! - [`cart`] - The client-side cart model and its single-shop invariant
//! - [`delivery`] - Delivery method and preference types
//! - [`savings`] - Luggage weight / baggage-fee savings estimation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod delivery;
pub mod savings;
pub mod types;

pub use cart::*;
pub use delivery::*;
pub use savings::*;
pub use types::*;
