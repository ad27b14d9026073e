//! Amount parsing, validation and formatting.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! All amounts are `rust_decimal::Decimal` and are stored as `NUMERIC(10, 2)`.

use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

/// Maximum number of decimal places an amount may carry.
pub const AMOUNT_DECIMAL_PLACES: u32 = 2;

/// Maximum number of significant digits an amount may carry.
pub const AMOUNT_MAX_DIGITS: u32 = 10;

/// Errors produced when reading or validating an amount.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    /// The text is not a decimal number.
    #[error("Not a valid amount: {0:?}")]
    Invalid(String),
    /// The amount is below zero.
    #[error("Amount cannot be negative: {0}")]
    Negative(Decimal),
    /// The amount has more than two decimal places.
    #[error("Amount has more than 2 decimal places: {0}")]
    TooPrecise(Decimal),
    /// The amount does not fit `NUMERIC(10, 2)`.
    #[error("Amount is too large: {0}")]
    TooLarge(Decimal),
}

/// Parses a user-supplied amount such as `"12.50"` or `"12,50"`.
///
/// A single comma is accepted as decimal separator when no dot is present.
/// The parsed value is validated with [`validate_amount`].
pub fn parse_amount(input: &str) -> Result<Decimal, AmountError> {
    let trimmed = input.trim();
    let normalized = if !trimmed.contains('.') && trimmed.matches(',').count() == 1 {
        trimmed.replace(',', ".")
    } else {
        trimmed.to_string()
    };

    let amount =
        Decimal::from_str(&normalized).map_err(|_| AmountError::Invalid(input.to_string()))?;
    validate_amount(amount)?;
    Ok(amount)
}

/// Validates that an amount is non-negative and fits `NUMERIC(10, 2)`.
pub fn validate_amount(amount: Decimal) -> Result<(), AmountError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(AmountError::Negative(amount));
    }
    if amount.normalize().scale() > AMOUNT_DECIMAL_PLACES {
        return Err(AmountError::TooPrecise(amount));
    }
    let limit = Decimal::from(10_i64.pow(AMOUNT_MAX_DIGITS - AMOUNT_DECIMAL_PLACES));
    if amount >= limit {
        return Err(AmountError::TooLarge(amount));
    }
    Ok(())
}

/// Formats an amount with exactly two decimal places.
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    let mut rounded = amount.round_dp(AMOUNT_DECIMAL_PLACES);
    rounded.rescale(AMOUNT_DECIMAL_PLACES);
    rounded.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case("12", dec!(12))]
    #[case("12.5", dec!(12.5))]
    #[case(" 12.50 ", dec!(12.50))]
    #[case("12,50", dec!(12.50))]
    #[case("0", dec!(0))]
    #[case("99999999.99", dec!(99999999.99))]
    fn test_parse_amount_valid(#[case] input: &str, #[case] expected: Decimal) {
        assert_eq!(parse_amount(input).unwrap(), expected);
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert_eq!(
            parse_amount("abc"),
            Err(AmountError::Invalid("abc".to_string()))
        );
        assert!(matches!(parse_amount(""), Err(AmountError::Invalid(_))));
        assert!(matches!(parse_amount("1.2.3"), Err(AmountError::Invalid(_))));
    }

    #[test]
    fn test_validate_amount_limits() {
        assert_eq!(
            validate_amount(dec!(-1)),
            Err(AmountError::Negative(dec!(-1)))
        );
        assert_eq!(
            validate_amount(dec!(1.005)),
            Err(AmountError::TooPrecise(dec!(1.005)))
        );
        assert_eq!(
            validate_amount(dec!(100000000)),
            Err(AmountError::TooLarge(dec!(100000000)))
        );
        // Trailing zeros beyond two places are not extra precision.
        assert!(validate_amount(dec!(1.5000)).is_ok());
    }

    #[test]
    fn test_format_amount_two_places() {
        assert_eq!(format_amount(dec!(60)), "60.00");
        assert_eq!(format_amount(dec!(12.5)), "12.50");
        assert_eq!(format_amount(dec!(0)), "0.00");
        assert_eq!(format_amount(dec!(33.333333)), "33.33");
    }
}
