//! Shopping cart state and its reducer.
//!
//! The cart is a plain value: every change goes through [`Cart::apply`] (or
//! the by-value [`Cart::reduce`]) with a [`CartAction`]. Lines are keyed by
//! SKU and size, so adding a shoe already in the cart bumps its quantity
//! instead of creating a second line.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::types::Money;

/// Largest quantity a single line may hold.
pub const MAX_LINE_QUANTITY: u32 = 9_999;

/// Coerce a raw client-supplied quantity into a valid line quantity.
///
/// Fractions are truncated, anything below one (including NaN and negative
/// infinity) becomes one, and values above [`MAX_LINE_QUANTITY`] are capped.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // range checked above the cast
pub fn coerce_quantity(raw: f64) -> u32 {
    if raw.is_nan() || raw < 1.0 {
        return 1;
    }
    if raw >= f64::from(MAX_LINE_QUANTITY) {
        return MAX_LINE_QUANTITY;
    }
    raw.trunc() as u32
}

/// Identity of a cart line: `"{sku}:{size}"`.
///
/// Both halves are trimmed whether the key is built here or parsed from a
/// client, so the two forms always compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub struct CartKey(String);

impl CartKey {
    #[must_use]
    pub fn new(sku: &str, size: &str) -> Self {
        Self(format!("{}:{}", sku.trim(), size.trim()))
    }

    fn parse(raw: &str) -> Self {
        match raw.rsplit_once(':') {
            Some((sku, size)) => Self::new(sku, size),
            None => Self(raw.trim().to_owned()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CartKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for CartKey {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<&str> for CartKey {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

/// One line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub key: CartKey,
    pub sku: String,
    pub name: String,
    pub size: String,
    pub unit_price_cents: Money,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colorway: Option<String>,
}

impl CartItem {
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price_cents.times(self.quantity)
    }
}

/// A change to the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CartAction {
    /// Add units of a SKU in a size. Quantity defaults to one.
    Add {
        sku: String,
        name: String,
        size: String,
        unit_price_cents: Money,
        #[serde(default)]
        quantity: Option<f64>,
        #[serde(default)]
        image: Option<String>,
        #[serde(default)]
        colorway: Option<String>,
    },
    /// Overwrite a line's quantity (coerced with [`coerce_quantity`]).
    SetQuantity { key: CartKey, quantity: f64 },
    /// Drop one line.
    Remove { key: CartKey },
    /// Drop every line.
    Clear,
}

/// The cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Apply an action and return the new state.
    #[must_use]
    pub fn reduce(mut self, action: CartAction) -> Self {
        self.apply(action);
        self
    }

    /// Apply an action in place.
    pub fn apply(&mut self, action: CartAction) {
        match action {
            CartAction::Add {
                sku,
                name,
                size,
                unit_price_cents,
                quantity,
                image,
                colorway,
            } => {
                let quantity = quantity.map_or(1, coerce_quantity);
                let key = CartKey::new(&sku, &size);

                if let Some(existing) = self.items.iter_mut().find(|item| item.key == key) {
                    existing.quantity = existing
                        .quantity
                        .saturating_add(quantity)
                        .min(MAX_LINE_QUANTITY);
                    return;
                }

                self.items.push(CartItem {
                    key,
                    sku: sku.trim().to_owned(),
                    name,
                    size: size.trim().to_owned(),
                    unit_price_cents,
                    quantity,
                    image,
                    colorway,
                });
            }
            CartAction::SetQuantity { key, quantity } => {
                if let Some(item) = self.items.iter_mut().find(|item| item.key == key) {
                    item.quantity = coerce_quantity(quantity);
                }
            }
            CartAction::Remove { key } => {
                self.items.retain(|item| item.key != key);
            }
            CartAction::Clear => self.items.clear(),
        }
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn get(&self, key: &CartKey) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.key == key)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Σ(unit price × quantity) over all lines.
    #[must_use]
    pub fn total_cents(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(sku: &str, size: &str, cents: i64, quantity: Option<f64>) -> CartAction {
        CartAction::Add {
            sku: sku.to_owned(),
            name: format!("Shoe {sku}"),
            size: size.to_owned(),
            unit_price_cents: Money::from_cents(cents),
            quantity,
            image: None,
            colorway: None,
        }
    }

    #[test]
    fn test_adding_same_sku_and_size_merges_lines() {
        let cart = Cart::new()
            .reduce(add("AJ1-CHI", "42", 18_000, None))
            .reduce(add("AJ1-CHI", "42", 18_000, Some(2.0)));

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 3);
    }

    #[test]
    fn test_same_sku_different_size_is_separate_line() {
        let cart = Cart::new()
            .reduce(add("AJ1-CHI", "42", 18_000, None))
            .reduce(add("AJ1-CHI", "43", 18_000, None));

        assert_eq!(cart.items().len(), 2);
        assert!(cart.get(&CartKey::new("AJ1-CHI", "43")).is_some());
    }

    #[test]
    fn test_set_quantity_clamps_and_truncates() {
        let key = CartKey::new("A", "40");
        let mut cart = Cart::new().reduce(add("A", "40", 5_000, Some(4.0)));

        cart.apply(CartAction::SetQuantity {
            key: key.clone(),
            quantity: 0.0,
        });
        assert_eq!(cart.get(&key).map(|i| i.quantity), Some(1));

        cart.apply(CartAction::SetQuantity {
            key: key.clone(),
            quantity: 2.7,
        });
        assert_eq!(cart.get(&key).map(|i| i.quantity), Some(2));

        cart.apply(CartAction::SetQuantity {
            key: key.clone(),
            quantity: -5.0,
        });
        assert_eq!(cart.get(&key).map(|i| i.quantity), Some(1));
    }

    #[test]
    fn test_set_quantity_unknown_key_is_noop() {
        let cart = Cart::new().reduce(add("A", "40", 5_000, None));
        let after = cart.clone().reduce(CartAction::SetQuantity {
            key: CartKey::new("B", "40"),
            quantity: 9.0,
        });
        assert_eq!(cart, after);
    }

    #[test]
    fn test_remove_only_drops_matching_line() {
        let cart = Cart::new()
            .reduce(add("A", "40", 5_000, None))
            .reduce(add("B", "41", 7_000, None))
            .reduce(add("C", "42", 9_000, None))
            .reduce(CartAction::Remove {
                key: CartKey::new("B", "41"),
            });

        let skus: Vec<&str> = cart.items().iter().map(|i| i.sku.as_str()).collect();
        assert_eq!(skus, ["A", "C"]);
    }

    #[test]
    fn test_total_and_count() {
        let cart = Cart::new()
            .reduce(add("A", "40", 5_000, Some(1.0)))
            .reduce(add("B", "41", 7_000, Some(3.0)));

        assert_eq!(cart.total_cents(), Money::from_cents(26_000));
        assert_eq!(cart.item_count(), 4);
    }

    #[test]
    fn test_clear_empties_cart() {
        let cart = Cart::new()
            .reduce(add("A", "40", 5_000, None))
            .reduce(CartAction::Clear);
        assert!(cart.is_empty());
        assert_eq!(cart.total_cents(), Money::ZERO);
    }

    #[test]
    fn test_coerce_quantity_edges() {
        assert_eq!(coerce_quantity(f64::NAN), 1);
        assert_eq!(coerce_quantity(f64::NEG_INFINITY), 1);
        assert_eq!(coerce_quantity(0.99), 1);
        assert_eq!(coerce_quantity(3.0), 3);
        assert_eq!(coerce_quantity(f64::INFINITY), MAX_LINE_QUANTITY);
    }

    #[test]
    fn test_action_deserializes_from_tagged_json() {
        let action: Result<CartAction, _> = serde_json::from_str(
            r#"{"type":"add","sku":"A","name":"Dunk","size":"40","unit_price_cents":5000}"#,
        );
        let cart = action.map(|a| Cart::new().reduce(a));
        assert_eq!(cart.map(|c| c.item_count()).ok(), Some(1));
    }

    #[test]
    fn test_client_key_with_padding_matches_stored_line() {
        let mut cart = Cart::new()
            .reduce(add("A", "40", 5_000, None))
            .reduce(add("B", "41", 7_000, None));

        cart.apply(CartAction::SetQuantity {
            key: CartKey::from("A:40 ".to_owned()),
            quantity: 3.0,
        });
        assert_eq!(cart.get(&CartKey::new("A", "40")).map(|item| item.quantity), Some(3));

        let key = serde_json::from_str::<CartKey>("\" B : 41\"").ok();
        assert_eq!(key, Some(CartKey::new("B", "41")));
        cart.apply(CartAction::Remove {
            key: CartKey::from(" B:41"),
        });
        assert_eq!(cart.items().len(), 1);
    }
}
