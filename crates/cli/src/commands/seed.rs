//! Catalog seeding from YAML.
//!
//! ```bash
//! sb-cli seed crates/cli/seed/catalog.yaml
//! ```
//!
//! Products are matched by silhouette name and gender, variants by SKU, so
//! re-running a seed file updates rows in place instead of duplicating them.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use solebox_core::inventory::validate_stock_level;
use solebox_core::{Gender, Money};
use solebox_storefront::db::products::NewVariant;
use solebox_storefront::db::{InventoryRepository, ProductRepository};

use super::{CliError, connect};

/// Top-level seed document.
#[derive(Debug, Deserialize)]
pub struct CatalogSeed {
    pub products: Vec<ProductSeed>,
}

/// One silhouette for one gender.
#[derive(Debug, Deserialize)]
pub struct ProductSeed {
    pub name: String,
    pub brand: String,
    pub gender: Gender,
    #[serde(default)]
    pub description: Option<String>,
    pub variants: Vec<VariantSeed>,
}

/// One size/colorway of a product.
#[derive(Debug, Deserialize)]
pub struct VariantSeed {
    pub sku: String,
    pub size: String,
    #[serde(default)]
    pub colorway: Option<String>,
    pub price_cents: Money,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub stock: i64,
}

/// Counts reported after seeding.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub products: usize,
    pub variants: usize,
    pub units: i64,
}

/// Check a seed document before anything is written.
///
/// Returns every problem found, empty when the document is valid.
#[must_use]
pub fn validate(seed: &CatalogSeed) -> Vec<String> {
    let mut errors = Vec::new();
    let mut skus = HashSet::new();

    for product in &seed.products {
        if product.name.trim().is_empty() {
            errors.push("product with an empty name".to_owned());
        }
        if product.variants.is_empty() {
            errors.push(format!("{}: no variants", product.name));
        }
        for variant in &product.variants {
            let sku = variant.sku.trim();
            if sku.is_empty() {
                errors.push(format!("{}: variant with an empty sku", product.name));
            } else if !skus.insert(sku.to_owned()) {
                errors.push(format!("{sku}: duplicate sku"));
            }
            if variant.price_cents.is_negative() {
                errors.push(format!("{sku}: negative price"));
            }
            if let Err(e) = validate_stock_level(variant.stock) {
                errors.push(format!("{sku}: {e}"));
            }
        }
    }

    errors
}

/// Parse a seed document.
///
/// # Errors
///
/// Returns `CliError::Seed` for malformed YAML.
pub fn parse(content: &str) -> Result<CatalogSeed, CliError> {
    serde_yaml::from_str(content).map_err(|e| CliError::Seed(e.to_string()))
}

/// Seed the catalog and stock levels from a YAML file.
///
/// # Errors
///
/// Returns an error if the file is unreadable or invalid, or a write fails.
pub async fn catalog(file_path: &str) -> Result<SeedSummary, CliError> {
    let path = Path::new(file_path);
    tracing::info!(path = %file_path, "Loading catalog seed");

    // Read and validate before connecting to the database
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CliError::Seed(format!("{file_path}: {e}")))?;
    let seed = parse(&content)?;

    let errors = validate(&seed);
    if !errors.is_empty() {
        tracing::error!("Seed validation failed:");
        for err in &errors {
            tracing::error!("  - {err}");
        }
        return Err(CliError::Seed(format!("{} validation errors found", errors.len())));
    }

    let pool = connect().await?;
    let products = ProductRepository::new(&pool);
    let inventory = InventoryRepository::new(&pool);
    let mut summary = SeedSummary::default();

    for product in &seed.products {
        let product_id = products
            .ensure_product(
                product.name.trim(),
                product.brand.trim(),
                product.gender,
                product.description.as_deref(),
            )
            .await?;
        summary.products += 1;

        for variant in &product.variants {
            let variant_id = products
                .upsert_variant(&NewVariant {
                    product_id,
                    sku: variant.sku.trim(),
                    size: variant.size.trim(),
                    colorway: variant.colorway.as_deref(),
                    price: variant.price_cents,
                    image_url: variant.image_url.as_deref(),
                })
                .await?;

            let stock = validate_stock_level(variant.stock)
                .map_err(|e| CliError::Seed(format!("{}: {e}", variant.sku)))?;
            inventory.upsert(variant_id, stock).await?;

            summary.variants += 1;
            summary.units += variant.stock;
        }
    }

    tracing::info!("Seeding complete!");
    tracing::info!("  Products: {}", summary.products);
    tracing::info!("  Variants: {}", summary.variants);
    tracing::info!("  Units in stock: {}", summary.units);

    Ok(summary)
}
