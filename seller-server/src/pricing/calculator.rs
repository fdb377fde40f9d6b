//! Price Calculator
//!
//! Pure functions deriving selling/final prices from base prices and
//! discount lists. Uses rust_decimal for precise calculations, stores as f64.

use rust_decimal::prelude::*;

use crate::db::models::{Discount, DiscountKind};
use crate::pricing::window::is_active_at;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Convert f64 to Decimal for calculation
#[inline]
pub(crate) fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub(crate) fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// A member line contributing to a bundle's composite price
#[derive(Debug, Clone, Copy)]
pub struct PriceLine {
    pub unit_price: f64,
    pub quantity: i64,
}

/// Selling price: list price minus the entity's own discount percentage
pub fn selling_price(mrp: f64, discount_pct: f64) -> f64 {
    let multiplier = Decimal::ONE - to_decimal(discount_pct) / Decimal::ONE_HUNDRED;
    to_f64(to_decimal(mrp) * multiplier)
}

/// Apply a single discount to a price
///
/// - `percentage`: price - price * value / 100
/// - `fixed`: price - value
pub fn apply_discount(price: f64, kind: DiscountKind, value: f64) -> f64 {
    let price = to_decimal(price);
    let value = to_decimal(value);
    let result = match kind {
        DiscountKind::Percentage => price - price * value / Decimal::ONE_HUNDRED,
        DiscountKind::Fixed => price - value,
    };
    to_f64(result)
}

/// Fold the currently active discounts over a base price, in list order.
///
/// Discounts whose validity window does not contain `now` are skipped;
/// the order of `discounts` determines the fold order.
pub fn calculate_final_price(base_price: f64, discounts: &[Discount], now: i64) -> f64 {
    discounts
        .iter()
        .filter(|d| is_active_at(d.start_at, d.end_at, now))
        .fold(base_price, |price, d| apply_discount(price, d.kind, d.value))
}

/// Composite price: discount fold on the base first, then additive member
/// lines (un-discounted), preserving this two-phase order exactly.
pub fn calculate_composite_price(
    base_price: f64,
    discounts: &[Discount],
    lines: &[PriceLine],
    now: i64,
) -> f64 {
    let discounted = calculate_final_price(base_price, discounts, now);
    let additions = lines.iter().fold(Decimal::ZERO, |acc, line| {
        acc + to_decimal(line.unit_price) * Decimal::from(line.quantity)
    });
    to_f64(to_decimal(discounted) + additions)
}

/// Apply a sale (category-level) discount percentage, rounding the result to
/// the nearest whole unit.
///
/// The rounded value is what gets persisted as the discounted selling price;
/// the applied percentage is recorded separately for later reversal.
pub fn apply_sale_discount(price: f64, discount_pct: f64) -> f64 {
    let multiplier = Decimal::ONE - to_decimal(discount_pct) / Decimal::ONE_HUNDRED;
    let discounted = to_decimal(price) * multiplier;
    discounted
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Reverse a sale discount: original = discounted / (1 - discount/100).
///
/// The forward direction rounds to whole units, so the round-trip may drift
/// by up to one unit. That loss is inherent to the recorded representation,
/// not something this function tries to repair.
pub fn revert_sale_discount(price: f64, discount_pct: f64) -> f64 {
    let multiplier = Decimal::ONE - to_decimal(discount_pct) / Decimal::ONE_HUNDRED;
    if multiplier.is_zero() {
        return price;
    }
    to_f64(to_decimal(price) / multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::DiscountTarget;
    use surrealdb::RecordId;

    const HOUR: i64 = 3_600_000;

    fn make_discount(kind: DiscountKind, value: f64, start_at: i64, end_at: i64) -> Discount {
        Discount {
            id: Some(RecordId::from_table_key("discount", "d1")),
            seller_id: RecordId::from_table_key("seller", "s1"),
            target: DiscountTarget::Product {
                id: RecordId::from_table_key("product", "p1"),
            },
            kind,
            value,
            start_at,
            end_at,
            is_active: true,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn active(kind: DiscountKind, value: f64) -> Discount {
        make_discount(kind, value, 0, 10 * HOUR)
    }

    #[test]
    fn test_selling_price() {
        assert_eq!(selling_price(100.0, 0.0), 100.0);
        assert_eq!(selling_price(100.0, 25.0), 75.0);
        assert_eq!(selling_price(99.99, 33.0), 66.99);
    }

    #[test]
    fn test_apply_percentage_discount() {
        assert_eq!(apply_discount(100.0, DiscountKind::Percentage, 10.0), 90.0);
    }

    #[test]
    fn test_apply_fixed_discount() {
        assert_eq!(apply_discount(100.0, DiscountKind::Fixed, 5.0), 95.0);
    }

    #[test]
    fn test_fold_order_determines_result() {
        // (100 * 0.9) - 5 = 85
        let discounts = vec![
            active(DiscountKind::Percentage, 10.0),
            active(DiscountKind::Fixed, 5.0),
        ];
        assert_eq!(calculate_final_price(100.0, &discounts, HOUR), 85.0);

        // (100 - 5) * 0.9 = 85.5 — reversing the list changes the fold
        let reversed = vec![
            active(DiscountKind::Fixed, 5.0),
            active(DiscountKind::Percentage, 10.0),
        ];
        assert_eq!(calculate_final_price(100.0, &reversed, HOUR), 85.5);
    }

    #[test]
    fn test_inactive_discounts_are_skipped() {
        let discounts = vec![
            // expired
            make_discount(DiscountKind::Percentage, 50.0, 0, HOUR),
            // pending
            make_discount(DiscountKind::Percentage, 50.0, 5 * HOUR, 6 * HOUR),
            // active
            make_discount(DiscountKind::Fixed, 10.0, HOUR, 4 * HOUR),
        ];
        assert_eq!(calculate_final_price(100.0, &discounts, 2 * HOUR), 90.0);
    }

    #[test]
    fn test_no_discounts_is_identity() {
        assert_eq!(calculate_final_price(42.5, &[], 0), 42.5);
    }

    #[test]
    fn test_composite_price_two_phase_order() {
        // Discount applies to the base only, lines are added afterwards:
        // (100 * 0.9) + 20*2 + 15 = 145, not (100 + 55) * 0.9
        let discounts = vec![active(DiscountKind::Percentage, 10.0)];
        let lines = vec![
            PriceLine {
                unit_price: 20.0,
                quantity: 2,
            },
            PriceLine {
                unit_price: 15.0,
                quantity: 1,
            },
        ];
        assert_eq!(
            calculate_composite_price(100.0, &discounts, &lines, HOUR),
            145.0
        );
    }

    #[test]
    fn test_sale_discount_rounds_to_whole_units() {
        // 90 * 0.9 = 81
        assert_eq!(apply_sale_discount(90.0, 10.0), 81.0);
        // 99 * 0.85 = 84.15 → 84
        assert_eq!(apply_sale_discount(99.0, 15.0), 84.0);
        // 0.5 rounds up
        assert_eq!(apply_sale_discount(99.0, 50.0), 50.0);
    }

    #[test]
    fn test_sale_discount_reversal_roundtrip_within_one_unit() {
        // Forward rounding makes the round-trip lossy by at most ±1
        for price in [90.0, 99.0, 123.0, 7.0] {
            for pct in [10.0, 15.0, 33.0] {
                let discounted = apply_sale_discount(price, pct);
                let restored = revert_sale_discount(discounted, pct);
                assert!(
                    (restored - price).abs() <= 1.0,
                    "price {price} pct {pct}: restored {restored}"
                );
            }
        }
    }

    #[test]
    fn test_revert_full_discount_is_identity() {
        // 100% discount cannot be reversed by division; the discounted price
        // is returned unchanged
        assert_eq!(revert_sale_discount(0.0, 100.0), 0.0);
    }

    #[test]
    fn test_precision_third_discount() {
        // 33% off ¥100 must be exactly 67.00 after 2dp rounding
        let discounts = vec![active(DiscountKind::Percentage, 33.0)];
        assert_eq!(calculate_final_price(100.0, &discounts, HOUR), 67.0);
    }

    #[test]
    fn test_precision_accumulated_lines() {
        let lines: Vec<PriceLine> = (0..1000)
            .map(|_| PriceLine {
                unit_price: 0.01,
                quantity: 1,
            })
            .collect();
        assert_eq!(calculate_composite_price(0.0, &[], &lines, 0), 10.0);
    }
}
