//! Inventory domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use solebox_core::VariantId;

/// Stock on hand for one variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryRecord {
    pub variant_id: VariantId,
    pub quantity: i32,
    pub updated_at: DateTime<Utc>,
}

/// Stock row with enough catalog context for the back office.
#[derive(Debug, Clone, Serialize)]
pub struct InventoryListing {
    pub variant_id: VariantId,
    pub sku: String,
    pub size: String,
    pub product_name: String,
    pub quantity: i32,
    pub updated_at: DateTime<Utc>,
}
