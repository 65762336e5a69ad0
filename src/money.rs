//! Exact money arithmetic for the checkout core.
//!
//! Every price computation in this crate goes through these helpers.
//! Amounts are `rust_decimal::Decimal` end to end; the canonical string form
//! has exactly two decimal places. Floating point is never used for money.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use crate::errors::ServiceError;

/// Parses a stored amount string into a `Decimal`.
///
/// A malformed value is a data-integrity fault, not user input: it aborts
/// the enclosing transaction.
pub fn parse_amount(raw: &str) -> Result<Decimal, ServiceError> {
    Decimal::from_str(raw.trim())
        .map_err(|e| ServiceError::MalformedAmount(format!("cannot parse {raw:?}: {e}")))
}

pub fn add(lhs: Decimal, rhs: Decimal) -> Result<Decimal, ServiceError> {
    lhs.checked_add(rhs)
        .ok_or_else(|| ServiceError::MalformedAmount(format!("overflow adding {lhs} + {rhs}")))
}

pub fn sub(lhs: Decimal, rhs: Decimal) -> Result<Decimal, ServiceError> {
    lhs.checked_sub(rhs)
        .ok_or_else(|| ServiceError::MalformedAmount(format!("overflow subtracting {lhs} - {rhs}")))
}

pub fn mul(lhs: Decimal, rhs: Decimal) -> Result<Decimal, ServiceError> {
    lhs.checked_mul(rhs)
        .ok_or_else(|| ServiceError::MalformedAmount(format!("overflow multiplying {lhs} * {rhs}")))
}

/// Checked division; division by zero is reported as `MalformedAmount`.
pub fn div(lhs: Decimal, rhs: Decimal) -> Result<Decimal, ServiceError> {
    lhs.checked_div(rhs)
        .ok_or_else(|| ServiceError::MalformedAmount(format!("cannot divide {lhs} by {rhs}")))
}

/// Canonical fixed-2-decimal rendering, midpoint rounded away from zero.
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.2}")
}

/// Discount-adjusted amount of one order line:
/// `unit_price * quantity * (1 - discount/100)`.
///
/// `discount` is an integer percent and must be in 0..=100; anything else in
/// the store is corrupt data.
pub fn line_amount(
    unit_price: Decimal,
    quantity: i32,
    discount: i32,
) -> Result<Decimal, ServiceError> {
    if !(0..=100).contains(&discount) {
        return Err(ServiceError::MalformedAmount(format!(
            "discount percent {discount} outside 0..=100"
        )));
    }
    if quantity < 0 {
        return Err(ServiceError::MalformedAmount(format!(
            "negative quantity {quantity}"
        )));
    }

    let gross = mul(unit_price, Decimal::from(quantity))?;
    let rate = div(Decimal::from(100 - discount), Decimal::from(100))?;
    mul(gross, rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    #[test]
    fn parses_stored_amounts() {
        assert_eq!(parse_amount("10.00").unwrap(), dec!(10.00));
        assert_eq!(parse_amount(" 0.05 ").unwrap(), dec!(0.05));
        assert_eq!(parse_amount("-3.20").unwrap(), dec!(-3.20));
    }

    #[test]
    fn rejects_malformed_amounts() {
        assert_matches!(parse_amount("ten"), Err(ServiceError::MalformedAmount(_)));
        assert_matches!(parse_amount("1.2.3"), Err(ServiceError::MalformedAmount(_)));
        assert_matches!(parse_amount(""), Err(ServiceError::MalformedAmount(_)));
    }

    #[test]
    fn division_by_zero_is_an_integrity_error() {
        assert_matches!(
            div(dec!(10), dec!(0)),
            Err(ServiceError::MalformedAmount(_))
        );
    }

    #[test]
    fn formats_to_two_decimals() {
        assert_eq!(format_amount(dec!(10)), "10.00");
        assert_eq!(format_amount(dec!(10.5)), "10.50");
        assert_eq!(format_amount(dec!(10.005)), "10.01");
        assert_eq!(format_amount(dec!(10.004)), "10.00");
        assert_eq!(format_amount(dec!(-2.345)), "-2.35");
    }

    #[test]
    fn line_amount_without_discount() {
        assert_eq!(line_amount(dec!(10.00), 5, 0).unwrap(), dec!(50.00));
    }

    #[test]
    fn line_amount_with_discount() {
        // 49.99 * 3 * 0.8 = 119.976; exact, no drift
        assert_eq!(line_amount(dec!(49.99), 3, 20).unwrap(), dec!(119.976));
        assert_eq!(format_amount(line_amount(dec!(49.99), 3, 20).unwrap()), "119.98");
    }

    #[test]
    fn full_discount_zeroes_the_line() {
        assert_eq!(line_amount(dec!(19.99), 2, 100).unwrap(), dec!(0.00));
    }

    #[test]
    fn rejects_out_of_range_discount() {
        assert_matches!(
            line_amount(dec!(10.00), 1, 101),
            Err(ServiceError::MalformedAmount(_))
        );
        assert_matches!(
            line_amount(dec!(10.00), 1, -1),
            Err(ServiceError::MalformedAmount(_))
        );
    }

    #[test]
    fn repeated_arithmetic_has_no_drift() {
        // 0.10 added ten times is exactly 1.00, unlike binary floats.
        let mut total = dec!(0);
        for _ in 0..10 {
            total = add(total, dec!(0.10)).unwrap();
        }
        assert_eq!(total, dec!(1.00));
        assert_eq!(format_amount(total), "1.00");
    }
}
