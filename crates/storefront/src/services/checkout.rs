//! Order submission.
//!
//! Validation happens in `solebox_core::checkout` before a connection is
//! taken from the pool. Everything after that runs in one transaction:
//! if any write fails the order, its lines, and the stock changes are all
//! rolled back together.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;

use solebox_core::cart::MAX_LINE_QUANTITY;
use solebox_core::checkout::{CheckoutError, CheckoutLine, OrderNumber, ValidatedCheckout};
use solebox_core::{Money, OrderId, UserId, VariantId};

use crate::db::inventory::DecrementResult;
use crate::db::orders::NewOrderItem;
use crate::db::{InventoryRepository, OrderRepository, ProductRepository, RepositoryError};
use crate::models::{InventoryRecord, NewOrder, OrderItem};

/// Errors from placing or amending an order.
#[derive(Debug, Error)]
pub enum CheckoutServiceError {
    /// The request failed validation; nothing was written.
    #[error(transparent)]
    Invalid(#[from] CheckoutError),

    /// A single order line failed validation.
    #[error("invalid order line: {0}")]
    InvalidLine(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Checkout request body.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub items: Vec<CheckoutLine>,
    #[serde(default)]
    pub shipping_address: Option<serde_json::Value>,
    /// Defaults to the shipping address.
    #[serde(default)]
    pub billing_address: Option<serde_json::Value>,
    #[serde(default)]
    pub payment_method: Option<String>,
}

/// What the shopper gets back after checkout.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutReceipt {
    pub order_id: OrderId,
    pub order_number: OrderNumber,
    pub total_amount: Decimal,
    /// SKUs that matched no variant and were left off the order.
    pub skipped_skus: Vec<String>,
}

/// Staff request to append a line to an existing order.
#[derive(Debug, Clone, Deserialize)]
pub struct AddOrderItemRequest {
    pub order_id: OrderId,
    pub variant_id: VariantId,
    pub quantity: u32,
    pub unit_price_cents: Money,
}

/// The stored line and the resulting stock level.
#[derive(Debug, Clone, Serialize)]
pub struct AddedOrderItem {
    pub item: OrderItem,
    pub inventory: Option<InventoryRecord>,
}

fn db_quantity(quantity: u32) -> i32 {
    // quantities are capped at MAX_LINE_QUANTITY during validation
    i32::try_from(quantity).unwrap_or(i32::MAX)
}

fn log_decrement(variant_id: VariantId, outcome: Option<&DecrementResult>) {
    match outcome {
        None => tracing::warn!(%variant_id, "no inventory row for ordered variant"),
        Some(result) if result.applied.shortfall() > 0 => tracing::warn!(
            %variant_id,
            requested = result.applied.requested,
            on_hand = result.applied.previous,
            shortfall = result.applied.shortfall(),
            "variant oversold, stock floored at zero"
        ),
        Some(result) => tracing::debug!(
            %variant_id,
            remaining = result.record.quantity,
            "stock decremented"
        ),
    }
}

/// A checkout line matched to a catalog variant.
struct ResolvedLine<'a> {
    line: &'a CheckoutLine,
    variant_id: VariantId,
}

fn resolved_total(lines: &[ResolvedLine<'_>]) -> Money {
    lines.iter().map(|resolved| resolved.line.line_total()).sum()
}

/// Places orders and order lines.
pub struct CheckoutService<'a> {
    pool: &'a PgPool,
}

impl<'a> CheckoutService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Validate and persist an order.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutServiceError::Invalid` before any database call for
    /// an empty or malformed item list, and `Repository` if a write fails
    /// (in which case the transaction is rolled back).
    pub async fn place_order(
        &self,
        user_id: Option<UserId>,
        request: CheckoutRequest,
    ) -> Result<CheckoutReceipt, CheckoutServiceError> {
        let checkout = ValidatedCheckout::new(request.items)?;
        let order_number = OrderNumber::generate(Utc::now().date_naive(), &mut rand::rng());
        let billing_address = request
            .billing_address
            .as_ref()
            .or(request.shipping_address.as_ref());

        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let mut resolved = Vec::with_capacity(checkout.lines().len());
        let mut skipped_skus = Vec::new();
        for line in checkout.lines() {
            match ProductRepository::find_variant_by_sku(&mut tx, &line.sku).await? {
                Some(variant) => resolved.push(ResolvedLine {
                    line,
                    variant_id: VariantId::new(variant.id),
                }),
                None => {
                    tracing::warn!(sku = %line.sku, order_number = %order_number, "unknown sku skipped at checkout");
                    skipped_skus.push(line.sku.clone());
                }
            }
        }

        // skipped lines are not charged
        let total = resolved_total(&resolved);

        let order = OrderRepository::insert_order(
            &mut tx,
            &NewOrder {
                order_number: &order_number,
                user_id,
                total_amount: total.to_decimal(),
                shipping_address: request.shipping_address.as_ref(),
                billing_address,
                payment_method: request.payment_method.as_deref(),
            },
        )
        .await?;

        for ResolvedLine { line, variant_id } in &resolved {
            OrderRepository::insert_item(
                &mut tx,
                &NewOrderItem {
                    order_id: order.id,
                    variant_id: *variant_id,
                    quantity: db_quantity(line.quantity),
                    unit_price: line.unit_price_cents.to_decimal(),
                    total_price: line.line_total().to_decimal(),
                },
            )
            .await?;

            let outcome =
                InventoryRepository::decrement_in(&mut tx, *variant_id, db_quantity(line.quantity))
                    .await?;
            log_decrement(*variant_id, outcome.as_ref());
        }

        tx.commit().await.map_err(RepositoryError::from)?;

        tracing::info!(
            order_id = %order.id,
            order_number = %order_number,
            total = %total,
            units = checkout.unit_count(),
            skipped = skipped_skus.len(),
            "order placed"
        );

        Ok(CheckoutReceipt {
            order_id: order.id,
            order_number,
            total_amount: order.total_amount,
            skipped_skus,
        })
    }

    /// Append one line to an existing order and take its units out of stock.
    ///
    /// # Errors
    ///
    /// Returns `Repository(NotFound)` if the order or variant doesn't exist,
    /// `InvalidLine` for a negative price or oversized quantity.
    pub async fn add_item(
        &self,
        request: &AddOrderItemRequest,
    ) -> Result<AddedOrderItem, CheckoutServiceError> {
        if request.unit_price_cents.is_negative() {
            return Err(CheckoutServiceError::InvalidLine(
                "unit_price_cents cannot be negative".to_owned(),
            ));
        }
        if request.quantity > MAX_LINE_QUANTITY {
            return Err(CheckoutServiceError::InvalidLine(format!(
                "quantity exceeds the maximum of {MAX_LINE_QUANTITY}"
            )));
        }
        let quantity = request.quantity.max(1);

        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        OrderRepository::lock(&mut tx, request.order_id).await?;

        let item = OrderRepository::insert_item(
            &mut tx,
            &NewOrderItem {
                order_id: request.order_id,
                variant_id: request.variant_id,
                quantity: db_quantity(quantity),
                unit_price: request.unit_price_cents.to_decimal(),
                total_price: request.unit_price_cents.times(quantity).to_decimal(),
            },
        )
        .await?;

        let outcome =
            InventoryRepository::decrement_in(&mut tx, request.variant_id, db_quantity(quantity))
                .await?;
        log_decrement(request.variant_id, outcome.as_ref());

        tx.commit().await.map_err(RepositoryError::from)?;

        Ok(AddedOrderItem {
            item,
            inventory: outcome.map(|result| result.record),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(sku: &str, quantity: u32, cents: i64) -> CheckoutLine {
        CheckoutLine {
            sku: sku.to_owned(),
            quantity,
            unit_price_cents: Money::from_cents(cents),
            size: None,
        }
    }

    #[test]
    fn test_resolved_total_covers_only_matched_lines() {
        let matched = line("RUN-42", 2, 32_500);
        let resolved = [ResolvedLine {
            line: &matched,
            variant_id: VariantId::new(7),
        }];
        assert_eq!(resolved_total(&resolved), Money::from_cents(65_000));
        assert_eq!(resolved_total(&[]), Money::from_cents(0));
    }

    #[test]
    fn test_db_quantity_saturates() {
        assert_eq!(db_quantity(3), 3);
        assert_eq!(db_quantity(u32::MAX), i32::MAX);
    }
}
