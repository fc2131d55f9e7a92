//! Order repository.
//!
//! Writes take a `&mut PgConnection` so the caller can run them inside a
//! transaction together with the inventory decrement.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use solebox_core::checkout::OrderNumber;
use solebox_core::{OrderId, OrderItemId, OrderStatus, PaymentStatus, UserId, VariantId};

use super::RepositoryError;
use crate::models::{NewOrder, Order, OrderDetail, OrderItem};

const ORDER_COLUMNS: &str = "id, order_number, user_id, status, payment_status, total_amount, \
                             shipping_address, billing_address, payment_method, created_at";

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    order_number: String,
    user_id: Option<i64>,
    status: OrderStatus,
    payment_status: PaymentStatus,
    total_amount: Decimal,
    shipping_address: Option<serde_json::Value>,
    billing_address: Option<serde_json::Value>,
    payment_method: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: OrderId::new(row.id),
            order_number: OrderNumber::from(row.order_number),
            user_id: row.user_id.map(UserId::new),
            status: row.status,
            payment_status: row.payment_status,
            total_amount: row.total_amount,
            shipping_address: row.shipping_address,
            billing_address: row.billing_address,
            payment_method: row.payment_method,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    id: i64,
    order_id: i64,
    product_variant_id: i64,
    sku: Option<String>,
    quantity: i32,
    unit_price: Decimal,
    total_price: Decimal,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            id: OrderItemId::new(row.id),
            order_id: OrderId::new(row.order_id),
            product_variant_id: VariantId::new(row.product_variant_id),
            sku: row.sku,
            quantity: row.quantity,
            unit_price: row.unit_price,
            total_price: row.total_price,
        }
    }
}

/// Fields for a new order line.
#[derive(Debug, Clone, Copy)]
pub struct NewOrderItem {
    pub order_id: OrderId,
    pub variant_id: VariantId,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

/// Repository for orders and their lines.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// A user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM storefront.order \
             WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id.as_i64())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// One order with its lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_detail(&self, id: OrderId) -> Result<Option<OrderDetail>, RepositoryError> {
        let order = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM storefront.order WHERE id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        let Some(order) = order else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT oi.id, oi.order_id, oi.product_variant_id, v.sku,
                   oi.quantity, oi.unit_price, oi.total_price
            FROM storefront.order_item oi
            LEFT JOIN storefront.product_variant v ON v.id = oi.product_variant_id
            WHERE oi.order_id = $1
            ORDER BY oi.id ASC
            ",
        )
        .bind(id.as_i64())
        .fetch_all(self.pool)
        .await?;

        Ok(Some(OrderDetail {
            order: order.into(),
            items: items.into_iter().map(Into::into).collect(),
        }))
    }

    /// Insert an order header with status and payment status `pending`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on an order number collision.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn insert_order(
        conn: &mut PgConnection,
        order: &NewOrder<'_>,
    ) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "INSERT INTO storefront.order \
                 (order_number, user_id, status, payment_status, total_amount, \
                  shipping_address, billing_address, payment_method) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(order.order_number.as_str())
        .bind(order.user_id.map(UserId::as_i64))
        .bind(OrderStatus::Pending)
        .bind(PaymentStatus::Pending)
        .bind(order.total_amount)
        .bind(order.shipping_address)
        .bind(order.billing_address)
        .bind(order.payment_method)
        .fetch_one(conn)
        .await
        .map_err(|e| RepositoryError::unique_violation(e, "order number"))?;

        Ok(row.into())
    }

    /// Insert one order line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order or variant doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn insert_item(
        conn: &mut PgConnection,
        item: &NewOrderItem,
    ) -> Result<OrderItem, RepositoryError> {
        let row = sqlx::query_as::<_, OrderItemRow>(
            r"
            WITH inserted AS (
                INSERT INTO storefront.order_item
                    (order_id, product_variant_id, quantity, unit_price, total_price)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, order_id, product_variant_id, quantity, unit_price, total_price
            )
            SELECT ins.id, ins.order_id, ins.product_variant_id, v.sku,
                   ins.quantity, ins.unit_price, ins.total_price
            FROM inserted ins
            LEFT JOIN storefront.product_variant v ON v.id = ins.product_variant_id
            ",
        )
        .bind(item.order_id.as_i64())
        .bind(item.variant_id.as_i64())
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(item.total_price)
        .fetch_one(conn)
        .await
        .map_err(RepositoryError::missing_reference)?;

        Ok(row.into())
    }

    /// Lock an order row for the rest of the transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn lock(conn: &mut PgConnection, id: OrderId) -> Result<(), RepositoryError> {
        sqlx::query_scalar::<_, i64>("SELECT id FROM storefront.order WHERE id = $1 FOR UPDATE")
            .bind(id.as_i64())
            .fetch_optional(conn)
            .await?
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}
