//! Catalog repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use solebox_core::catalog::VariantListing;
use solebox_core::{Gender, Money, ProductId, VariantId};

use super::RepositoryError;
use crate::models::{Product, ProductDetail, Variant};

fn price_from_db(price: Decimal, sku: &str) -> Result<Money, RepositoryError> {
    Money::from_decimal(price).ok_or_else(|| {
        RepositoryError::DataCorruption(format!("price {price} for {sku} is out of range"))
    })
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    brand: String,
    gender: Gender,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            name: row.name,
            brand: row.brand,
            gender: row.gender,
            description: row.description,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct VariantRow {
    id: i64,
    product_id: i64,
    sku: String,
    size: String,
    colorway: Option<String>,
    price: Decimal,
    image_url: Option<String>,
    stock: Option<i32>,
}

impl TryFrom<VariantRow> for Variant {
    type Error = RepositoryError;

    fn try_from(row: VariantRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: VariantId::new(row.id),
            product_id: ProductId::new(row.product_id),
            price_cents: price_from_db(row.price, &row.sku)?,
            sku: row.sku,
            size: row.size,
            colorway: row.colorway,
            image_url: row.image_url,
            stock: row.stock,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ListingRow {
    product_id: i64,
    variant_id: i64,
    name: String,
    brand: String,
    gender: Gender,
    sku: String,
    size: String,
    colorway: Option<String>,
    price: Decimal,
    image_url: Option<String>,
    stock: Option<i32>,
}

impl TryFrom<ListingRow> for VariantListing {
    type Error = RepositoryError;

    fn try_from(row: ListingRow) -> Result<Self, Self::Error> {
        Ok(Self {
            product_id: ProductId::new(row.product_id),
            variant_id: VariantId::new(row.variant_id),
            price: price_from_db(row.price, &row.sku)?,
            silhouette: row.name,
            brand: row.brand,
            gender: row.gender,
            sku: row.sku,
            size: row.size,
            colorway: row.colorway,
            image_url: row.image_url,
            in_stock: row.stock.is_some_and(|q| q > 0),
        })
    }
}

/// Variant fields resolved during checkout.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VariantRef {
    pub id: i64,
    pub sku: String,
}

/// A variant to write from a seed file.
#[derive(Debug, Clone)]
pub struct NewVariant<'a> {
    pub product_id: ProductId,
    pub sku: &'a str,
    pub size: &'a str,
    pub colorway: Option<&'a str>,
    pub price: Money,
    pub image_url: Option<&'a str>,
}

/// Repository for catalog queries.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Flat variant rows for the listing page, in catalog order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_variants(
        &self,
        gender: Option<Gender>,
    ) -> Result<Vec<VariantListing>, RepositoryError> {
        let rows = sqlx::query_as::<_, ListingRow>(
            r"
            SELECT p.id AS product_id, v.id AS variant_id, p.name, p.brand, p.gender,
                   v.sku, v.size, v.colorway, v.price, v.image_url,
                   i.quantity AS stock
            FROM storefront.product p
            JOIN storefront.product_variant v ON v.product_id = p.id
            LEFT JOIN storefront.inventory i ON i.variant_id = v.id
            WHERE $1::storefront.gender IS NULL OR p.gender = $1
            ORDER BY p.id ASC, v.id ASC
            ",
        )
        .bind(gender)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(VariantListing::try_from).collect()
    }

    /// A product with all of its variants and stock levels.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_detail(&self, id: ProductId) -> Result<Option<ProductDetail>, RepositoryError> {
        let product = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, brand, gender, description, created_at
            FROM storefront.product
            WHERE id = $1
            ",
        )
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        let Some(product) = product else {
            return Ok(None);
        };

        let variants = sqlx::query_as::<_, VariantRow>(
            r"
            SELECT v.id, v.product_id, v.sku, v.size, v.colorway, v.price, v.image_url,
                   i.quantity AS stock
            FROM storefront.product_variant v
            LEFT JOIN storefront.inventory i ON i.variant_id = v.id
            WHERE v.product_id = $1
            ORDER BY v.id ASC
            ",
        )
        .bind(id.as_i64())
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(Variant::try_from)
        .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(ProductDetail {
            product: product.into(),
            variants,
        }))
    }

    /// Find a product by silhouette name and gender, creating it if missing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn ensure_product(
        &self,
        name: &str,
        brand: &str,
        gender: Gender,
        description: Option<&str>,
    ) -> Result<ProductId, RepositoryError> {
        let existing: Option<i64> = sqlx::query_scalar(
            r"
            SELECT id FROM storefront.product
            WHERE lower(name) = lower($1) AND gender = $2
            ORDER BY id ASC
            LIMIT 1
            ",
        )
        .bind(name)
        .bind(gender)
        .fetch_optional(self.pool)
        .await?;

        if let Some(id) = existing {
            return Ok(ProductId::new(id));
        }

        let id: i64 = sqlx::query_scalar(
            r"
            INSERT INTO storefront.product (name, brand, gender, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(name)
        .bind(brand)
        .bind(gender)
        .bind(description)
        .fetch_one(self.pool)
        .await?;

        Ok(ProductId::new(id))
    }

    /// Insert a variant, or update it in place if the SKU already exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_variant(&self, variant: &NewVariant<'_>) -> Result<VariantId, RepositoryError> {
        let id: i64 = sqlx::query_scalar(
            r"
            INSERT INTO storefront.product_variant
                (product_id, sku, size, colorway, price, image_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (sku) DO UPDATE
            SET product_id = EXCLUDED.product_id,
                size = EXCLUDED.size,
                colorway = EXCLUDED.colorway,
                price = EXCLUDED.price,
                image_url = EXCLUDED.image_url
            RETURNING id
            ",
        )
        .bind(variant.product_id.as_i64())
        .bind(variant.sku)
        .bind(variant.size)
        .bind(variant.colorway)
        .bind(variant.price.to_decimal())
        .bind(variant.image_url)
        .fetch_one(self.pool)
        .await?;

        Ok(VariantId::new(id))
    }

    /// Resolve a SKU inside an open transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_variant_by_sku(
        conn: &mut PgConnection,
        sku: &str,
    ) -> Result<Option<VariantRef>, RepositoryError> {
        let row = sqlx::query_as::<_, VariantRef>(
            "SELECT id, sku FROM storefront.product_variant WHERE sku = $1",
        )
        .bind(sku)
        .fetch_optional(conn)
        .await?;

        Ok(row)
    }
}
