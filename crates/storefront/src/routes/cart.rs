//! Cart route handlers.
//!
//! The cart lives in the session as a serialized [`Cart`]. Each mutation
//! loads it, applies one [`CartAction`] and writes it back.

use axum::{
    Json,
    extract::rejection::JsonRejection,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use solebox_core::Money;
use solebox_core::cart::{Cart, CartAction, CartItem, CartKey};

use crate::error::Result;
use crate::models::session_keys;

/// Cart as returned to the client.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub total_cents: Money,
    /// Formatted total, e.g. `$260.00`.
    pub total: String,
    pub item_count: u64,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().to_vec(),
            total_cents: cart.total_cents(),
            total: cart.total_cents().display(),
            item_count: cart.item_count(),
        }
    }
}

/// Cart badge count.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CartCount {
    pub count: u64,
}

/// Load the session cart, or an empty one.
///
/// A cart that no longer deserializes is discarded.
pub(crate) async fn load_cart(session: &Session) -> Result<Cart> {
    match session.get::<Cart>(session_keys::CART).await {
        Ok(cart) => Ok(cart.unwrap_or_default()),
        Err(tower_sessions::session::Error::SerdeJson(e)) => {
            tracing::warn!(error = %e, "discarding unreadable session cart");
            Ok(Cart::new())
        }
        Err(e) => Err(e.into()),
    }
}

async fn save_cart(session: &Session, cart: &Cart) -> Result<()> {
    session.insert(session_keys::CART, cart).await?;
    Ok(())
}

/// Empty the session cart.
pub(crate) async fn clear_cart(session: &Session) -> Result<()> {
    session.remove::<Cart>(session_keys::CART).await?;
    Ok(())
}

async fn apply(session: &Session, action: CartAction) -> Result<Json<CartView>> {
    let cart = load_cart(session).await?.reduce(action);
    save_cart(session, &cart).await?;
    Ok(Json(CartView::from(&cart)))
}

/// Add to cart request body.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub sku: String,
    pub name: String,
    pub size: String,
    pub unit_price_cents: Money,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub colorway: Option<String>,
}

impl From<AddToCartRequest> for CartAction {
    fn from(req: AddToCartRequest) -> Self {
        Self::Add {
            sku: req.sku,
            name: req.name,
            size: req.size,
            unit_price_cents: req.unit_price_cents,
            quantity: req.quantity,
            image: req.image,
            colorway: req.colorway,
        }
    }
}

/// Update quantity request body.
#[derive(Debug, Deserialize)]
pub struct UpdateCartRequest {
    pub key: CartKey,
    pub quantity: f64,
}

/// Remove line request body.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartRequest {
    pub key: CartKey,
}

/// Show the cart.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<Json<CartView>> {
    let cart = load_cart(&session).await?;
    Ok(Json(CartView::from(&cart)))
}

/// Add an item. Adding an existing (sku, size) raises its quantity.
#[instrument(skip(session, body))]
pub async fn add(
    session: Session,
    body: std::result::Result<Json<AddToCartRequest>, JsonRejection>,
) -> Result<Json<CartView>> {
    let Json(req) = body?;
    tracing::debug!(sku = %req.sku, size = %req.size, "add to cart");
    apply(&session, req.into()).await
}

/// Overwrite a line's quantity.
#[instrument(skip(session, body))]
pub async fn update(
    session: Session,
    body: std::result::Result<Json<UpdateCartRequest>, JsonRejection>,
) -> Result<Json<CartView>> {
    let Json(req) = body?;
    apply(
        &session,
        CartAction::SetQuantity {
            key: req.key,
            quantity: req.quantity,
        },
    )
    .await
}

/// Remove a line.
#[instrument(skip(session, body))]
pub async fn remove(
    session: Session,
    body: std::result::Result<Json<RemoveFromCartRequest>, JsonRejection>,
) -> Result<Json<CartView>> {
    let Json(req) = body?;
    apply(&session, CartAction::Remove { key: req.key }).await
}

/// Total units in the cart.
#[instrument(skip(session))]
pub async fn count(session: Session) -> Result<Json<CartCount>> {
    let cart = load_cart(&session).await?;
    Ok(Json(CartCount {
        count: cart.item_count(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_view_totals() {
        let cart = Cart::new()
            .reduce(CartAction::Add {
                sku: "A".into(),
                name: "Runner".into(),
                size: "40".into(),
                unit_price_cents: Money::from_cents(5000),
                quantity: None,
                image: None,
                colorway: None,
            })
            .reduce(CartAction::Add {
                sku: "B".into(),
                name: "Court".into(),
                size: "41".into(),
                unit_price_cents: Money::from_cents(7000),
                quantity: Some(3.0),
                image: None,
                colorway: None,
            });

        let view = CartView::from(&cart);
        assert_eq!(view.total_cents, Money::from_cents(26_000));
        assert_eq!(view.total, "$260.00");
        assert_eq!(view.item_count, 4);
        assert_eq!(view.items.len(), 2);
    }
}
