//! Inventory ledger persistence.
//!
//! Decrements are a single conditional `UPDATE`, so two checkouts racing
//! for the last pair cannot both read the same stock level and lose a
//! write. The row is floored at zero in SQL and by a `CHECK` constraint.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use solebox_core::VariantId;
use solebox_core::inventory::Decrement;

use super::RepositoryError;
use crate::models::{InventoryListing, InventoryRecord};

#[derive(sqlx::FromRow)]
struct InventoryRow {
    variant_id: i64,
    quantity: i32,
    updated_at: DateTime<Utc>,
}

impl From<InventoryRow> for InventoryRecord {
    fn from(row: InventoryRow) -> Self {
        Self {
            variant_id: VariantId::new(row.variant_id),
            quantity: row.quantity,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct DecrementRow {
    #[sqlx(flatten)]
    record: InventoryRow,
    previous: i32,
}

#[derive(sqlx::FromRow)]
struct ListingRow {
    variant_id: i64,
    sku: String,
    size: String,
    product_name: String,
    quantity: i32,
    updated_at: DateTime<Utc>,
}

impl From<ListingRow> for InventoryListing {
    fn from(row: ListingRow) -> Self {
        Self {
            variant_id: VariantId::new(row.variant_id),
            sku: row.sku,
            size: row.size,
            product_name: row.product_name,
            quantity: row.quantity,
            updated_at: row.updated_at,
        }
    }
}

/// The stored record after a decrement, plus the arithmetic that produced it.
#[derive(Debug, Clone)]
pub struct DecrementResult {
    pub record: InventoryRecord,
    pub applied: Decrement,
}

/// Repository for stock levels.
pub struct InventoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> InventoryRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Stock for one variant.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, variant_id: VariantId) -> Result<Option<InventoryRecord>, RepositoryError> {
        let row = sqlx::query_as::<_, InventoryRow>(
            r"
            SELECT variant_id, quantity, updated_at
            FROM storefront.inventory
            WHERE variant_id = $1
            ",
        )
        .bind(variant_id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Every stock record with its SKU, ordered by SKU.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<InventoryListing>, RepositoryError> {
        let rows = sqlx::query_as::<_, ListingRow>(
            r"
            SELECT i.variant_id, v.sku, v.size, p.name AS product_name,
                   i.quantity, i.updated_at
            FROM storefront.inventory i
            JOIN storefront.product_variant v ON v.id = i.variant_id
            JOIN storefront.product p ON p.id = v.product_id
            ORDER BY v.sku ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Set the absolute stock level for a variant.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the variant doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn upsert(
        &self,
        variant_id: VariantId,
        quantity: i32,
    ) -> Result<InventoryRecord, RepositoryError> {
        let row = sqlx::query_as::<_, InventoryRow>(
            r"
            INSERT INTO storefront.inventory (variant_id, quantity)
            VALUES ($1, $2)
            ON CONFLICT (variant_id) DO UPDATE
            SET quantity = EXCLUDED.quantity, updated_at = NOW()
            RETURNING variant_id, quantity, updated_at
            ",
        )
        .bind(variant_id.as_i64())
        .bind(quantity)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::missing_reference)?;

        Ok(row.into())
    }

    /// Decrement stock outside a transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no inventory row exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn decrement(
        &self,
        variant_id: VariantId,
        quantity: i32,
    ) -> Result<DecrementResult, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        Self::decrement_in(&mut *conn, variant_id, quantity)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Apply `max(stock - quantity, 0)` on an open connection or transaction.
    ///
    /// Returns `None` when the variant has no inventory row. Negative
    /// quantities are treated as zero.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn decrement_in(
        conn: &mut PgConnection,
        variant_id: VariantId,
        quantity: i32,
    ) -> Result<Option<DecrementResult>, RepositoryError> {
        let requested = quantity.max(0);

        let row = sqlx::query_as::<_, DecrementRow>(
            r"
            UPDATE storefront.inventory i
            SET quantity = GREATEST(i.quantity - $2, 0),
                updated_at = NOW()
            FROM (
                SELECT variant_id, quantity
                FROM storefront.inventory
                WHERE variant_id = $1
                FOR UPDATE
            ) old
            WHERE i.variant_id = old.variant_id
            RETURNING i.variant_id, i.quantity, i.updated_at, old.quantity AS previous
            ",
        )
        .bind(variant_id.as_i64())
        .bind(requested)
        .fetch_optional(conn)
        .await?;

        Ok(row.map(|row| DecrementResult {
            applied: Decrement::apply(row.previous, requested),
            record: row.record.into(),
        }))
    }
}
