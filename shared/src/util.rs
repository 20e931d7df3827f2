/// 当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Milliseconds in one day
pub const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

/// Convert an amount in minor currency units (cents) to major units.
///
/// Assumes a two-decimal currency, which is what the storefront sells in.
pub fn minor_to_major(amount: i64) -> rust_decimal::Decimal {
    rust_decimal::Decimal::new(amount, 2)
}

/// Convert a major-unit price to minor units, rounding half away from zero.
///
/// `None` when the result does not fit in an `i64`.
pub fn major_to_minor(amount: rust_decimal::Decimal) -> Option<i64> {
    use rust_decimal::prelude::ToPrimitive;
    amount
        .checked_mul(rust_decimal::Decimal::ONE_HUNDRED)?
        .round_dp_with_strategy(0, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn test_minor_to_major() {
        assert_eq!(minor_to_major(4500), Decimal::from_str("45.00").unwrap());
        assert_eq!(minor_to_major(1), Decimal::from_str("0.01").unwrap());
        assert_eq!(minor_to_major(0), Decimal::ZERO);
    }

    #[test]
    fn test_major_to_minor_rounds() {
        assert_eq!(major_to_minor(Decimal::from_str("10.50").unwrap()), Some(1050));
        assert_eq!(major_to_minor(Decimal::from_str("2.005").unwrap()), Some(201));
        assert_eq!(major_to_minor(Decimal::from_str("3").unwrap()), Some(300));
    }

    #[test]
    fn test_major_to_minor_out_of_range() {
        assert_eq!(major_to_minor(Decimal::MAX), None);
        assert_eq!(major_to_minor(Decimal::from(i64::MAX)), None);
    }
}
