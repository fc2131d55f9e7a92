//! Checkout route handler.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use tower_sessions::Session;
use tracing::instrument;

use solebox_core::checkout::CheckoutLine;

use super::cart::{clear_cart, load_cart};
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::services::CheckoutService;
use crate::services::checkout::{CheckoutReceipt, CheckoutRequest};
use crate::state::AppState;

/// Place an order for the authenticated user.
///
/// When the body carries no items the session cart is checked out
/// instead. The session cart is emptied once the order commits.
#[instrument(skip(state, session, body), fields(user_id = %user.id))]
pub async fn pay(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    body: std::result::Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CheckoutReceipt>)> {
    let Json(mut request) = body?;

    if request.items.is_empty() {
        request.items = CheckoutLine::from_cart(&load_cart(&session).await?);
    }

    let receipt = CheckoutService::new(state.pool())
        .place_order(Some(user.id), request)
        .await?;

    if let Err(e) = clear_cart(&session).await {
        // The order is committed; a stale cart is the shopper's to clear.
        tracing::warn!(error = %e, order_number = %receipt.order_number, "failed to clear cart");
    }

    Ok((StatusCode::CREATED, Json(receipt)))
}
