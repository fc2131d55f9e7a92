//! Stock level rules.
//!
//! Stock never goes negative: selling more units than are on hand leaves
//! the shelf at zero and records the shortfall instead.

use serde::Serialize;

/// Result of taking units out of stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Decrement {
    pub previous: i32,
    pub requested: i32,
    pub remaining: i32,
}

impl Decrement {
    /// Apply `max(previous - requested, 0)`.
    ///
    /// A negative request is treated as zero; decrements never add stock.
    #[must_use]
    pub const fn apply(previous: i32, requested: i32) -> Self {
        let requested = if requested < 0 { 0 } else { requested };
        let remaining = previous.saturating_sub(requested);
        Self {
            previous,
            requested,
            remaining: if remaining < 0 { 0 } else { remaining },
        }
    }

    /// Units that were requested but not on hand.
    #[must_use]
    pub const fn shortfall(&self) -> i32 {
        let on_hand = if self.previous < 0 { 0 } else { self.previous };
        let short = self.requested.saturating_sub(on_hand);
        if short < 0 { 0 } else { short }
    }
}

/// `max(current - quantity, 0)`.
#[must_use]
pub const fn clamped_decrement(current: i32, quantity: i32) -> i32 {
    Decrement::apply(current, quantity).remaining
}

/// Errors for direct stock writes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StockLevelError {
    #[error("stock level cannot be negative (got {0})")]
    Negative(i64),
    #[error("stock level {0} is too large")]
    TooLarge(i64),
}

/// Validate an absolute stock level before it is written.
///
/// # Errors
///
/// Returns [`StockLevelError`] for negative values or values past `i32::MAX`.
pub fn validate_stock_level(quantity: i64) -> Result<i32, StockLevelError> {
    if quantity < 0 {
        return Err(StockLevelError::Negative(quantity));
    }
    i32::try_from(quantity).map_err(|_| StockLevelError::TooLarge(quantity))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decrement_within_stock() {
        let d = Decrement::apply(10, 3);
        assert_eq!(d.remaining, 7);
        assert_eq!(d.shortfall(), 0);
    }

    #[test]
    fn test_decrement_floors_at_zero() {
        let d = Decrement::apply(2, 5);
        assert_eq!(d.remaining, 0);
        assert_eq!(d.shortfall(), 3);
        assert_eq!(clamped_decrement(0, 1), 0);
    }

    #[test]
    fn test_negative_request_does_not_restock() {
        assert_eq!(clamped_decrement(4, -10), 4);
    }

    #[test]
    fn test_extreme_values_do_not_overflow() {
        assert_eq!(clamped_decrement(i32::MIN, i32::MAX), 0);
        assert_eq!(clamped_decrement(i32::MAX, i32::MAX), 0);
    }

    #[test]
    fn test_validate_stock_level() {
        assert_eq!(validate_stock_level(12), Ok(12));
        assert_eq!(validate_stock_level(-1), Err(StockLevelError::Negative(-1)));
        assert!(matches!(
            validate_stock_level(i64::from(i32::MAX) + 1),
            Err(StockLevelError::TooLarge(_))
        ));
    }
}
