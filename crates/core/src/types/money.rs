//! Cents-based money.
//!
//! All arithmetic happens on integer minor units. Conversion to a decimal
//! amount happens only at the edges: when writing `NUMERIC(12,2)` columns
//! and when formatting for display.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// An amount of US dollars, stored as whole cents.
///
/// Arithmetic saturates instead of wrapping so a hostile quantity can never
/// flip a total negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Price of `quantity` units at this unit price.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(i64::from(quantity)))
    }

    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// The amount in dollars with exactly two decimal places.
    #[must_use]
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Convert a dollar amount to cents, rounding half away from zero to
    /// two decimal places first.
    ///
    /// Returns `None` if the amount does not fit in `i64` cents.
    #[must_use]
    pub fn from_decimal(amount: Decimal) -> Option<Self> {
        let rounded =
            amount.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero);
        rounded
            .checked_mul(Decimal::ONE_HUNDRED)?
            .to_i64()
            .map(Self)
    }

    /// Format for display, e.g. `$1,260.00`.
    #[must_use]
    pub fn display(self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let dollars = (abs / 100).to_string();
        let cents = abs % 100;

        let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
        for (i, ch) in dollars.chars().enumerate() {
            if i > 0 && (dollars.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        format!("{sign}${grouped}.{cents:02}")
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        self.saturating_add(rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::saturating_add)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(0).display(), "$0.00");
        assert_eq!(Money::from_cents(5).display(), "$0.05");
        assert_eq!(Money::from_cents(26_000).display(), "$260.00");
        assert_eq!(Money::from_cents(123_456_789).display(), "$1,234,567.89");
        assert_eq!(Money::from_cents(-1_050).display(), "-$10.50");
    }

    #[test]
    fn test_decimal_conversion() {
        assert_eq!(
            Money::from_cents(26_000).to_decimal().to_string(),
            "260.00"
        );
        let parsed = Decimal::from_str("129.995").ok().and_then(Money::from_decimal);
        assert_eq!(parsed, Some(Money::from_cents(13_000)));
        let parsed = Decimal::from_str("70").ok().and_then(Money::from_decimal);
        assert_eq!(parsed, Some(Money::from_cents(7_000)));
    }

    #[test]
    fn test_times_and_sum_saturate() {
        assert_eq!(Money::from_cents(7_000).times(3), Money::from_cents(21_000));
        assert_eq!(Money::from_cents(i64::MAX).times(2), Money::from_cents(i64::MAX));

        let total: Money = [Money::from_cents(i64::MAX), Money::from_cents(1)]
            .into_iter()
            .sum();
        assert_eq!(total, Money::from_cents(i64::MAX));
    }
}
