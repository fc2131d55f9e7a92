//! Domain models for the storefront.
//!
//! These are validated domain objects, separate from the database row
//! types in `crate::db`. All of them serialize as API response bodies.

pub mod inventory;
pub mod order;
pub mod product;
pub mod session;
pub mod user;

pub use inventory::{InventoryListing, InventoryRecord};
pub use order::{NewOrder, Order, OrderDetail, OrderItem};
pub use product::{Product, ProductDetail, Variant};
pub use session::keys as session_keys;
pub use user::{CurrentUser, User};
