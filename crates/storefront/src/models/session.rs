//! Session-related types.

/// Session keys.
pub mod keys {
    /// Key for the shopper's cart (`solebox_core::cart::Cart`).
    pub const CART: &str = "cart";
}
