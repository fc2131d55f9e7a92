//! Business logic services for the storefront.
//!
//! - `auth` - Registration, login, access tokens
//! - `checkout` - Transactional order placement

pub mod auth;
pub mod checkout;

pub use auth::{AuthError, AuthService, TokenService};
pub use checkout::{CheckoutService, CheckoutServiceError};
