//! Derived pricing.
//!
//! Nothing here is stored: subtotal, bundle discount and total are computed
//! from cart lines on demand. Rounding happens once, at the end, to the
//! nearest integer currency unit.

use super::state::{CartLine, NegotiatedDiscount};
use crate::config::PricingConfig;

/// Sum of price × quantity over all lines.
pub fn subtotal(lines: &[CartLine]) -> f64 {
    lines
        .iter()
        .map(|l| l.product.price * f64::from(l.quantity))
        .sum()
}

/// Flat discount applied once the cart holds enough distinct lines.
pub fn bundle_discount(lines: &[CartLine], config: &PricingConfig) -> f64 {
    if lines.len() >= config.bundle_min_lines {
        config.bundle_discount
    } else {
        0.0
    }
}

/// Final amount due, in whole currency units.
///
/// The negotiated percentage applies multiplicatively after the flat
/// bundle discount; the result is rounded once and clamped at zero.
pub fn total(
    lines: &[CartLine],
    discount: Option<&NegotiatedDiscount>,
    config: &PricingConfig,
) -> u64 {
    let percent = discount.map(|d| d.percent()).unwrap_or(0.0);
    let raw = (subtotal(lines) - bundle_discount(lines, config)) * (100.0 - percent) / 100.0;
    raw.round().max(0.0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Product;

    fn line(id: &str, price: f64, quantity: u32) -> CartLine {
        CartLine {
            product: Product {
                id: id.to_string(),
                name: id.to_string(),
                description: String::new(),
                price,
                floor_price: price / 2.0,
                category: "X".to_string(),
                image: String::new(),
                tags: Vec::new(),
                embedding: None,
            },
            quantity,
        }
    }

    fn config() -> PricingConfig {
        PricingConfig::default()
    }

    #[test]
    fn test_subtotal_sums_price_times_quantity() {
        let lines = vec![line("a", 100.0, 2), line("b", 50.0, 1)];
        assert_eq!(subtotal(&lines), 250.0);
    }

    #[test]
    fn test_bundle_discount_needs_two_distinct_lines() {
        let one = vec![line("a", 100.0, 5)];
        assert_eq!(bundle_discount(&one, &config()), 0.0, "quantity is not lines");

        let two = vec![line("a", 100.0, 1), line("b", 50.0, 1)];
        assert_eq!(bundle_discount(&two, &config()), 50.0);
    }

    #[test]
    fn test_worked_scenario_total() {
        // A ×2 at 100 plus B at 50: subtotal 250, bundle 50, total 200.
        let lines = vec![line("a", 100.0, 2), line("b", 50.0, 1)];
        assert_eq!(total(&lines, None, &config()), 200);
    }

    #[test]
    fn test_negotiated_discount_applies_after_bundle() {
        let lines = vec![line("a", 100.0, 2), line("b", 50.0, 1)];
        let discount = NegotiatedDiscount::new(10.0, None);
        // (250 − 50) × 0.9 = 180
        assert_eq!(total(&lines, Some(&discount), &config()), 180);
    }

    #[test]
    fn test_total_clamped_at_zero() {
        // Bundle discount larger than the subtotal must not go negative.
        let lines = vec![line("a", 20.0, 1), line("b", 10.0, 1)];
        assert_eq!(total(&lines, None, &config()), 0);

        let full = NegotiatedDiscount::new(100.0, None);
        let normal = vec![line("a", 100.0, 2), line("b", 50.0, 1)];
        assert_eq!(total(&normal, Some(&full), &config()), 0);
    }

    #[test]
    fn test_total_non_increasing_in_discount_percent() {
        let lines = vec![line("a", 99.5, 3), line("b", 14.0, 2)];
        let mut previous = u64::MAX;
        for percent in [0.0, 5.0, 25.0, 50.0, 75.0, 99.0, 100.0] {
            let discount = NegotiatedDiscount::new(percent, None);
            let current = total(&lines, Some(&discount), &config());
            assert!(
                current <= previous,
                "total went up at {}%: {} > {}",
                percent,
                current,
                previous
            );
            previous = current;
        }
    }

    #[test]
    fn test_rounding_happens_once_at_the_end() {
        // 3 × 33.335 = 100.005 → bundle inactive → round(100.005) = 100.
        let lines = vec![line("a", 33.335, 3)];
        assert_eq!(total(&lines, None, &config()), 100);
    }

    #[test]
    fn test_empty_cart_totals_zero() {
        assert_eq!(subtotal(&[]), 0.0);
        assert_eq!(total(&[], None, &config()), 0);
    }
}
