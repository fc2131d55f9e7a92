//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! # Auth (rate limited)
//! POST  /auth/register           - Create account, returns token
//! POST  /auth/login              - Returns token
//!
//! # Catalog
//! GET   /products                - Grouped listing (?gender=&color=)
//! GET   /products/{id}           - Product with variants and stock
//!
//! # Cart (session)
//! GET   /cart                    - Cart contents
//! POST  /cart/add                - Add item
//! POST  /cart/update             - Set line quantity
//! POST  /cart/remove             - Remove line
//! GET   /cart/count              - Unit count
//!
//! # Checkout (auth)
//! POST  /checkout/pay            - Place order
//!
//! # Orders
//! GET   /orders                  - Caller's orders (auth)
//! GET   /orders/{id}             - One order (auth, owner or staff)
//! POST  /orders/items            - Append line (seller|admin)
//!
//! # Inventory
//! GET   /inventory               - All stock (seller|admin)
//! PUT   /inventory               - Set stock level (admin)
//! POST  /inventory/decrement     - Decrement stock (seller|admin)
//! GET   /inventory/{variant_id}  - One variant's stock
//!
//! # Admin
//! GET   /admin/users             - All accounts
//! GET   /admin/users/{id}        - One account
//! PATCH /admin/users/{id}        - Change role
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod inventory;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .layer(auth_rate_limiter())
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/items", post(orders::add_item))
        .route("/{id}", get(orders::show))
}

/// Create the inventory routes router.
pub fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(inventory::index).put(inventory::upsert))
        .route("/decrement", post(inventory::decrement))
        .route("/{variant_id}", get(inventory::show))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin::list_users))
        .route(
            "/users/{id}",
            get(admin::get_user).patch(admin::update_role),
        )
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .route("/checkout/pay", post(checkout::pay))
        .nest("/orders", order_routes())
        .nest("/inventory", inventory_routes())
        .nest("/admin", admin_routes())
}
