//! Cross-module properties of the core crate.

use solebox_core::Money;
use solebox_core::cart::{Cart, CartAction, CartKey};
use solebox_core::catalog::{ColorBucket, group_variants};
use solebox_core::checkout::{CheckoutError, CheckoutLine, ValidatedCheckout};
use solebox_core::inventory::clamped_decrement;

fn add(sku: &str, size: &str, cents: i64, quantity: f64) -> CartAction {
    CartAction::Add {
        sku: sku.to_owned(),
        name: sku.to_owned(),
        size: size.to_owned(),
        unit_price_cents: Money::from_cents(cents),
        quantity: Some(quantity),
        image: None,
        colorway: None,
    }
}

#[test]
fn test_cart_checkout_totals_agree() {
    let cart = Cart::new()
        .reduce(add("A", "40", 5000, 1.0))
        .reduce(add("B", "41", 7000, 3.0));

    assert_eq!(cart.total_cents(), Money::from_cents(26_000));
    assert_eq!(cart.item_count(), 4);

    let checkout = ValidatedCheckout::new(CheckoutLine::from_cart(&cart)).unwrap();
    assert_eq!(checkout.total(), cart.total_cents());
    assert_eq!(checkout.total_amount().to_string(), "260.00");
    assert_eq!(checkout.unit_count(), 4);
}

#[test]
fn test_fractional_quantity_is_clamped() {
    let cart = Cart::new()
        .reduce(add("A", "40", 5000, 2.7))
        .reduce(CartAction::SetQuantity {
            key: CartKey::new("A", "40"),
            quantity: 0.4,
        });

    assert_eq!(cart.items().first().unwrap().quantity, 1);
}

#[test]
fn test_checkout_of_empty_cart_is_rejected() {
    let lines = CheckoutLine::from_cart(&Cart::new());
    assert_eq!(ValidatedCheckout::new(lines), Err(CheckoutError::EmptyCart));
}

#[test]
fn test_decrement_never_goes_negative() {
    for (stock, quantity) in [(0, 1), (3, 5), (5, 5), (i32::MAX, 1), (2, i32::MAX)] {
        let remaining = clamped_decrement(stock, quantity);
        assert!(remaining >= 0);
        assert_eq!(remaining, (stock - quantity.min(stock)).max(0));
    }
}

#[test]
fn test_color_buckets_from_colorways() {
    assert_eq!(
        ColorBucket::classify("University Red/Sail"),
        Some(ColorBucket::Red)
    );
    assert_eq!(
        ColorBucket::families("Wolf Grey/Tan"),
        vec![ColorBucket::Grey, ColorBucket::Brown]
    );
    assert!(group_variants(Vec::new()).is_empty());
}
