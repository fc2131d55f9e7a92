//! Catalog domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use solebox_core::{Gender, Money, ProductId, VariantId};

/// A silhouette in one fit (e.g. "Air Jordan 1 High", men's).
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub brand: String,
    pub gender: Gender,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One sellable size/colorway of a product.
#[derive(Debug, Clone, Serialize)]
pub struct Variant {
    pub id: VariantId,
    pub product_id: ProductId,
    pub sku: String,
    pub size: String,
    pub colorway: Option<String>,
    pub price_cents: Money,
    pub image_url: Option<String>,
    /// `None` when no inventory row has been written yet.
    pub stock: Option<i32>,
}

/// Product page payload.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub variants: Vec<Variant>,
}
