//! Checkout validation, totals, and order numbers.
//!
//! Everything here runs before the first database call, so a rejected
//! checkout never touches storage.

use core::fmt;

use chrono::NaiveDate;
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cart::{Cart, MAX_LINE_QUANTITY};
use crate::types::Money;

/// Reasons a checkout request is refused before persistence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("empty cart")]
    EmptyCart,

    #[error("line {index} is missing a sku")]
    MissingSku { index: usize },

    #[error("sku {sku} has a negative price")]
    NegativePrice { sku: String },

    #[error("sku {sku} exceeds the maximum quantity of {max}")]
    QuantityTooLarge { sku: String, max: u32 },
}

/// One line of a checkout request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutLine {
    pub sku: String,
    pub quantity: u32,
    pub unit_price_cents: Money,
    #[serde(default)]
    pub size: Option<String>,
}

impl CheckoutLine {
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price_cents.times(self.quantity)
    }

    /// Checkout lines for everything in a cart.
    #[must_use]
    pub fn from_cart(cart: &Cart) -> Vec<Self> {
        cart.items()
            .iter()
            .map(|item| Self {
                sku: item.sku.clone(),
                quantity: item.quantity,
                unit_price_cents: item.unit_price_cents,
                size: Some(item.size.clone()),
            })
            .collect()
    }
}

/// A checkout that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCheckout {
    lines: Vec<CheckoutLine>,
    total: Money,
}

impl ValidatedCheckout {
    /// Validate lines and compute the order total.
    ///
    /// Zero quantities are raised to one, matching the cart's rule.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] for an empty list, or the first
    /// line-level problem found.
    pub fn new(lines: Vec<CheckoutLine>) -> Result<Self, CheckoutError> {
        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let mut normalized = Vec::with_capacity(lines.len());
        for (index, mut line) in lines.into_iter().enumerate() {
            line.sku = line.sku.trim().to_owned();
            if line.sku.is_empty() {
                return Err(CheckoutError::MissingSku { index });
            }
            if line.unit_price_cents.is_negative() {
                return Err(CheckoutError::NegativePrice { sku: line.sku });
            }
            if line.quantity > MAX_LINE_QUANTITY {
                return Err(CheckoutError::QuantityTooLarge {
                    sku: line.sku,
                    max: MAX_LINE_QUANTITY,
                });
            }
            line.quantity = line.quantity.max(1);
            normalized.push(line);
        }

        let total = normalized.iter().map(CheckoutLine::line_total).sum();
        Ok(Self {
            lines: normalized,
            total,
        })
    }

    #[must_use]
    pub fn lines(&self) -> &[CheckoutLine] {
        &self.lines
    }

    #[must_use]
    pub const fn total(&self) -> Money {
        self.total
    }

    /// Total in dollars, two decimal places.
    #[must_use]
    pub fn total_amount(&self) -> Decimal {
        self.total.to_decimal()
    }

    /// Total number of units ordered.
    #[must_use]
    pub fn unit_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }
}

/// Human-readable order reference, e.g. `SB-20261014-7KQ2XM`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    pub const PREFIX: &'static str = "SB";

    /// No 0/O or 1/I, so references survive being read over the phone.
    const ALPHABET: &'static [u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
    const SUFFIX_LEN: usize = 6;

    /// Generate an order number for the given day.
    pub fn generate<R: Rng + ?Sized>(date: NaiveDate, rng: &mut R) -> Self {
        let suffix: String = (0..Self::SUFFIX_LEN)
            .map(|_| {
                let idx = rng.random_range(0..Self::ALPHABET.len());
                char::from(Self::ALPHABET.get(idx).copied().unwrap_or(b'X'))
            })
            .collect();

        Self(format!(
            "{}-{}-{suffix}",
            Self::PREFIX,
            date.format("%Y%m%d")
        ))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for OrderNumber {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::cart::CartAction;

    fn line(sku: &str, quantity: u32, cents: i64) -> CheckoutLine {
        CheckoutLine {
            sku: sku.to_owned(),
            quantity,
            unit_price_cents: Money::from_cents(cents),
            size: None,
        }
    }

    #[test]
    fn test_empty_checkout_rejected() {
        assert_eq!(
            ValidatedCheckout::new(Vec::new()),
            Err(CheckoutError::EmptyCart)
        );
    }

    #[test]
    fn test_total_is_exact_in_cents() {
        let checkout = ValidatedCheckout::new(vec![line("A", 1, 5_000), line("B", 3, 7_000)]);
        let checkout = checkout.ok();

        assert_eq!(
            checkout.as_ref().map(ValidatedCheckout::total),
            Some(Money::from_cents(26_000))
        );
        assert_eq!(
            checkout.as_ref().map(|c| c.total_amount().to_string()),
            Some("260.00".to_owned())
        );
        assert_eq!(checkout.map(|c| c.unit_count()), Some(4));
    }

    #[test]
    fn test_odd_cents_convert_without_float_error() {
        // 0.1 + 0.2 style inputs stay exact
        let checkout = ValidatedCheckout::new(vec![line("A", 3, 10), line("B", 1, 20)]).ok();
        assert_eq!(
            checkout.map(|c| c.total_amount().to_string()),
            Some("0.50".to_owned())
        );
    }

    #[test]
    fn test_zero_quantity_coerced_to_one() {
        let checkout = ValidatedCheckout::new(vec![line("A", 0, 5_000)]).ok();
        assert_eq!(
            checkout.as_ref().map(|c| c.lines()[0].quantity),
            Some(1)
        );
        assert_eq!(checkout.map(|c| c.total()), Some(Money::from_cents(5_000)));
    }

    #[test]
    fn test_line_validation() {
        assert_eq!(
            ValidatedCheckout::new(vec![line("A", 1, 100), line("  ", 1, 100)]),
            Err(CheckoutError::MissingSku { index: 1 })
        );
        assert_eq!(
            ValidatedCheckout::new(vec![line("A", 1, -1)]),
            Err(CheckoutError::NegativePrice {
                sku: "A".to_owned()
            })
        );
        assert!(matches!(
            ValidatedCheckout::new(vec![line("A", MAX_LINE_QUANTITY + 1, 1)]),
            Err(CheckoutError::QuantityTooLarge { .. })
        ));
    }

    #[test]
    fn test_lines_from_cart() {
        let cart = Cart::new().reduce(CartAction::Add {
            sku: "DUNK-LO".to_owned(),
            name: "Dunk Low".to_owned(),
            size: "44".to_owned(),
            unit_price_cents: Money::from_cents(11_000),
            quantity: Some(2.0),
            image: None,
            colorway: None,
        });

        let lines = CheckoutLine::from_cart(&cart);
        assert_eq!(lines, vec![CheckoutLine {
            sku: "DUNK-LO".to_owned(),
            quantity: 2,
            unit_price_cents: Money::from_cents(11_000),
            size: Some("44".to_owned()),
        }]);
    }

    #[test]
    fn test_order_number_format() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap_or_default();
        let mut rng = StdRng::seed_from_u64(7);
        let number = OrderNumber::generate(date, &mut rng);

        let parts: Vec<&str> = number.as_str().split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "SB");
        assert_eq!(parts[1], "20261014");
        assert_eq!(parts[2].len(), 6);
        assert!(
            parts[2]
                .bytes()
                .all(|b| OrderNumber::ALPHABET.contains(&b))
        );
    }

    #[test]
    fn test_order_numbers_differ() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap_or_default();
        let mut rng = StdRng::seed_from_u64(42);
        let a = OrderNumber::generate(date, &mut rng);
        let b = OrderNumber::generate(date, &mut rng);
        assert_ne!(a, b);
    }
}
