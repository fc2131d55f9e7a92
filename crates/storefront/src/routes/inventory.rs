//! Inventory route handlers.

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use solebox_core::VariantId;
use solebox_core::inventory::validate_stock_level;

use crate::db::InventoryRepository;
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireStaff};
use crate::models::{InventoryListing, InventoryRecord};
use crate::state::AppState;

/// Absolute stock level for a variant.
#[derive(Debug, Deserialize)]
pub struct SetStockRequest {
    pub variant_id: VariantId,
    pub quantity: i64,
}

/// Take units out of stock.
#[derive(Debug, Deserialize)]
pub struct DecrementRequest {
    pub variant_id: VariantId,
    pub quantity: i64,
}

/// Stock after a decrement.
#[derive(Debug, Serialize)]
pub struct DecrementResponse {
    #[serde(flatten)]
    pub record: InventoryRecord,
    pub previous: i32,
    /// Units requested but not on hand.
    pub shortfall: i32,
}

/// Every stock record (staff).
#[instrument(skip(state), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
) -> Result<Json<Vec<InventoryListing>>> {
    let listing = InventoryRepository::new(state.pool()).list().await?;
    Ok(Json(listing))
}

/// Stock for one variant.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    path: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<InventoryRecord>> {
    let Path(variant_id) = path?;
    InventoryRepository::new(state.pool())
        .get(VariantId::new(variant_id))
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("inventory for variant {variant_id}")))
}

/// Set a variant's stock level (admin).
#[instrument(skip(state, body), fields(user_id = %user.id))]
pub async fn upsert(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    body: std::result::Result<Json<SetStockRequest>, JsonRejection>,
) -> Result<Json<InventoryRecord>> {
    let Json(req) = body?;
    let quantity =
        validate_stock_level(req.quantity).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let record = InventoryRepository::new(state.pool())
        .upsert(req.variant_id, quantity)
        .await?;

    tracing::info!(variant_id = %req.variant_id, quantity, "stock level set");

    Ok(Json(record))
}

/// Decrement a variant's stock, flooring at zero (staff).
#[instrument(skip(state, body), fields(user_id = %user.id))]
pub async fn decrement(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    body: std::result::Result<Json<DecrementRequest>, JsonRejection>,
) -> Result<Json<DecrementResponse>> {
    let Json(req) = body?;
    let quantity = i32::try_from(req.quantity.max(0)).unwrap_or(i32::MAX);

    let result = InventoryRepository::new(state.pool())
        .decrement(req.variant_id, quantity)
        .await?;

    if result.applied.shortfall() > 0 {
        tracing::warn!(
            variant_id = %req.variant_id,
            requested = quantity,
            on_hand = result.applied.previous,
            "decrement exceeded stock, floored at zero"
        );
    }

    Ok(Json(DecrementResponse {
        previous: result.applied.previous,
        shortfall: result.applied.shortfall(),
        record: result.record,
    }))
}
