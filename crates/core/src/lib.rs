//! SoleBox Core - Shared types and storefront rules.
//!
//! This crate provides the pieces used across all SoleBox components:
//! - `storefront` - JSON API server for catalog, cart, checkout and inventory
//! - `cli` - Command-line tools for migrations, seeding and user management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. Everything that decides a number (cart totals, order
//! totals, stock levels) lives here so it can be tested without a server.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, money, emails, and statuses
//! - [`cart`] - Cart state and its reducer
//! - [`checkout`] - Checkout validation, totals, and order numbers
//! - [`inventory`] - Clamped stock decrements
//! - [`catalog`] - Grouping variant rows into listings and color buckets

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod inventory;
pub mod types;

pub use types::*;
