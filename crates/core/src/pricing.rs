//! Discount selection and line pricing.

/// Region used for discount lookup. Fixed for now; it is not derived from
/// the request or from CRM account data, so only the US rate is reachable.
pub const DEFAULT_REGION: &str = "US";

/// Default discount rate for a sales region. Unknown regions get no
/// discount.
pub fn regional_discount_rate(region: &str) -> f64 {
    match region {
        "US" => 0.10,
        "EU" => 0.15,
        "APAC" => 0.05,
        _ => 0.0,
    }
}

/// Rate applied to a single line: a per-line override percentage wins over
/// the regional default when present.
pub fn effective_discount_rate(default_rate: f64, override_pct: Option<f64>) -> f64 {
    match override_pct {
        Some(pct) => pct / 100.0,
        None => default_rate,
    }
}

/// Per-unit price after discount. The discount is applied to the line total
/// and divided back by quantity, so a zero quantity yields a non-finite
/// value; callers reject those.
pub fn discounted_unit_price(quantity: f64, unit_price: f64, rate: f64) -> f64 {
    let discounted_total = (quantity * unit_price) * (1.0 - rate);
    discounted_total / quantity
}

#[cfg(test)]
mod tests {
    use super::{
        discounted_unit_price, effective_discount_rate, regional_discount_rate, DEFAULT_REGION,
    };

    #[test]
    fn region_lookup_is_a_pure_table() {
        assert_eq!(regional_discount_rate("US"), 0.10);
        assert_eq!(regional_discount_rate("EU"), 0.15);
        assert_eq!(regional_discount_rate("APAC"), 0.05);
        assert_eq!(regional_discount_rate("LATAM"), 0.0);
        assert_eq!(regional_discount_rate(""), 0.0);
    }

    #[test]
    fn default_region_gets_the_us_rate() {
        assert_eq!(regional_discount_rate(DEFAULT_REGION), 0.10);
    }

    #[test]
    fn override_percentage_wins_over_default_rate() {
        assert_eq!(effective_discount_rate(0.10, Some(20.0)), 0.20);
        assert_eq!(effective_discount_rate(0.10, Some(0.0)), 0.0);
        assert_eq!(effective_discount_rate(0.10, None), 0.10);
    }

    #[test]
    fn discounts_unit_price_through_the_line_total() {
        // 2 × 100 at 10% off: 200 * 0.9 / 2 = 90 per unit.
        let unit_price = discounted_unit_price(2.0, 100.0, 0.10);
        assert!((unit_price - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn full_discount_zeroes_the_unit_price() {
        let unit_price = discounted_unit_price(3.0, 50.0, 1.0);
        assert_eq!(unit_price, 0.0);
    }

    #[test]
    fn zero_quantity_produces_a_non_finite_price() {
        let unit_price = discounted_unit_price(0.0, 100.0, 0.10);
        assert!(!unit_price.is_finite());
    }
}
