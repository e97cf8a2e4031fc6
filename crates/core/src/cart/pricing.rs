//! Price derivation rules for the cart.
//!
//! All four derived fields are pinned to two decimal places. Rounding order
//! matters: tax is computed from the *rounded* items price, not the raw
//! sum, so the figures a user sees always add up without cent drift.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::CartItem;

/// Orders strictly over this amount ship free.
fn free_shipping_threshold() -> Decimal {
    Decimal::ONE_HUNDRED
}

/// Flat shipping fee below the free-shipping threshold.
fn flat_shipping_fee() -> Decimal {
    Decimal::TEN
}

/// Sales tax rate applied to the items price.
fn tax_rate() -> Decimal {
    Decimal::new(15, 2) // 0.15
}

/// Round half-away-from-zero to two decimal places, keeping a scale of
/// exactly 2 so the value serializes as e.g. "10.00" rather than "10".
#[must_use]
pub fn round2(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// The derived price fields of a cart or order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub items_price: Decimal,
    pub shipping_price: Decimal,
    pub tax_price: Decimal,
    pub total_price: Decimal,
}

/// Derive the price breakdown from a list of line items.
///
/// - `items_price = round2(sum(price * qty))`
/// - `shipping_price` is 0.00 when `items_price` is strictly over 100,
///   otherwise 10.00 (the boundary at exactly 100.00 pays shipping)
/// - `tax_price = round2(0.15 * items_price)`, from the rounded items price
/// - `total_price = round2(items_price + shipping_price + tax_price)`
#[must_use]
pub fn price_breakdown(items: &[CartItem]) -> PriceBreakdown {
    let raw_items: Decimal = items
        .iter()
        .map(|item| item.price * Decimal::from(item.qty))
        .sum();
    let items_price = round2(raw_items);

    let shipping_price = if items_price > free_shipping_threshold() {
        round2(Decimal::ZERO)
    } else {
        round2(flat_shipping_fee())
    };

    let tax_price = round2(tax_rate() * items_price);
    let total_price = round2(items_price + shipping_price + tax_price);

    PriceBreakdown {
        items_price,
        shipping_price,
        tax_price,
        total_price,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProductId;

    fn item(id: i64, price: &str, qty: u32) -> CartItem {
        CartItem {
            id: ProductId::new(id),
            name: String::new(),
            image: String::new(),
            price: price.parse().unwrap(),
            count_in_stock: 1,
            qty,
        }
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn round2_is_half_away_from_zero() {
        assert_eq!(round2(dec("2.675")).to_string(), "2.68");
        assert_eq!(round2(dec("2.674")).to_string(), "2.67");
        assert_eq!(round2(dec("13.4985")).to_string(), "13.50");
        assert_eq!(round2(dec("-2.675")).to_string(), "-2.68");
    }

    #[test]
    fn round2_pins_two_decimal_places() {
        assert_eq!(round2(Decimal::ZERO).to_string(), "0.00");
        assert_eq!(round2(Decimal::TEN).to_string(), "10.00");
        assert_eq!(round2(dec("89.9")).to_string(), "89.90");
    }

    #[test]
    fn worked_example_single_item() {
        // {price: 89.99, qty: 1} => 89.99 / 10.00 / 13.50 / 113.49
        let breakdown = price_breakdown(&[item(1, "89.99", 1)]);
        assert_eq!(breakdown.items_price.to_string(), "89.99");
        assert_eq!(breakdown.shipping_price.to_string(), "10.00");
        assert_eq!(breakdown.tax_price.to_string(), "13.50");
        assert_eq!(breakdown.total_price.to_string(), "113.49");
    }

    #[test]
    fn items_over_one_hundred_ship_free() {
        let breakdown = price_breakdown(&[item(1, "75.00", 2)]);
        assert_eq!(breakdown.items_price.to_string(), "150.00");
        assert_eq!(breakdown.shipping_price.to_string(), "0.00");
        assert_eq!(breakdown.tax_price.to_string(), "22.50");
        assert_eq!(breakdown.total_price.to_string(), "172.50");
    }

    #[test]
    fn shipping_boundary_is_strictly_greater_than_one_hundred() {
        // Exactly 100.00 still pays shipping; one cent more ships free.
        let at = price_breakdown(&[item(1, "100.00", 1)]);
        assert_eq!(at.shipping_price.to_string(), "10.00");

        let over = price_breakdown(&[item(1, "100.01", 1)]);
        assert_eq!(over.shipping_price.to_string(), "0.00");
    }

    #[test]
    fn tax_is_computed_from_the_rounded_items_price() {
        // Raw sum 99.996 rounds up to 100.00 before the tax multiply, so
        // tax is exactly 15.00 and the boundary check sees 100.00.
        let breakdown = price_breakdown(&[item(1, "33.332", 3)]);
        assert_eq!(breakdown.items_price.to_string(), "100.00");
        assert_eq!(breakdown.tax_price, round2(dec("0.15") * breakdown.items_price));
        assert_eq!(breakdown.tax_price.to_string(), "15.00");
        assert_eq!(breakdown.shipping_price.to_string(), "10.00");
    }

    #[test]
    fn total_is_idempotent_over_derived_fields() {
        let breakdown = price_breakdown(&[item(1, "89.99", 1), item(2, "3.33", 3)]);
        let recomputed =
            round2(breakdown.items_price + breakdown.shipping_price + breakdown.tax_price);
        assert_eq!(recomputed, breakdown.total_price);
    }

    #[test]
    fn empty_cart_derives_shipping_only() {
        let breakdown = price_breakdown(&[]);
        assert_eq!(breakdown.items_price.to_string(), "0.00");
        assert_eq!(breakdown.shipping_price.to_string(), "10.00");
        assert_eq!(breakdown.tax_price.to_string(), "0.00");
        assert_eq!(breakdown.total_price.to_string(), "10.00");
    }

    #[test]
    fn quantities_multiply_before_summing() {
        let breakdown = price_breakdown(&[item(1, "1.01", 7), item(2, "2.50", 2)]);
        assert_eq!(breakdown.items_price.to_string(), "12.07");
    }
}
