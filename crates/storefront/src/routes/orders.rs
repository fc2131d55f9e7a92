//! Order route handlers.

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use tracing::instrument;

use solebox_core::OrderId;

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::{RequireAuth, RequireStaff};
use crate::models::{Order, OrderDetail};
use crate::services::CheckoutService;
use crate::services::checkout::{AddOrderItemRequest, AddedOrderItem};
use crate::state::AppState;

/// The caller's orders, newest first.
#[instrument(skip(state), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;
    Ok(Json(orders))
}

/// One order with its lines.
///
/// Customers only see their own orders; anyone else's answers 404 so
/// order IDs can't be guessed.
#[instrument(skip(state), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    path: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<OrderDetail>> {
    let Path(id) = path?;
    let not_found = || AppError::NotFound(format!("order {id}"));

    let detail = OrderRepository::new(state.pool())
        .get_detail(OrderId::new(id))
        .await?
        .ok_or_else(not_found)?;

    if !user.can_view(detail.order.user_id) {
        return Err(not_found());
    }

    Ok(Json(detail))
}

/// Append a line to an existing order (staff).
#[instrument(skip(state, body), fields(user_id = %user.id))]
pub async fn add_item(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    body: std::result::Result<Json<AddOrderItemRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AddedOrderItem>)> {
    let Json(req) = body?;

    let added = CheckoutService::new(state.pool())
        .add_item(&req)
        .await?;

    tracing::info!(order_id = %req.order_id, variant_id = %req.variant_id, "order item added");

    Ok((StatusCode::CREATED, Json(added)))
}
