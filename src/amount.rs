use crate::error::ChainError;
use fixed::types::I32F32;
use std::str::FromStr;

/// Fixed-point value type for deterministic balance arithmetic.
pub type Amount = I32F32;

/// Fee charged when a transaction does not specify one. Approx 0.01
pub const DEFAULT_FEE: Amount = I32F32::from_bits(42_949_673);
/// Credited to the miner of every block.
pub const DEFAULT_MINING_REWARD: Amount = I32F32::from_bits(10i64 << 32);
/// Digits kept when rendering an amount for humans.
pub const DISPLAY_PRECISION: usize = 8;

/// Parses a decimal string such as `"49.99"` into an [`Amount`].
pub fn parse_amount(input: &str) -> Result<Amount, ChainError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ChainError::InvalidAmount("empty amount".to_string()));
    }
    Amount::from_str(trimmed)
        .map_err(|e| ChainError::InvalidAmount(format!("'{}': {}", trimmed, e)))
}

/// Converts a configuration float into an [`Amount`], rejecting NaN, infinities
/// and values outside the representable range.
pub fn amount_from_f64(value: f64) -> Result<Amount, ChainError> {
    if !value.is_finite() {
        return Err(ChainError::InvalidAmount(format!("{} is not finite", value)));
    }
    Amount::checked_from_num(value)
        .ok_or_else(|| ChainError::InvalidAmount(format!("{} is out of range", value)))
}

/// Renders an amount with trailing zeros trimmed, e.g. `49.99` or `10`.
pub fn format_amount(amount: Amount) -> String {
    let rendered = format!("{:.*}", DISPLAY_PRECISION, amount.to_num::<f64>());
    let rendered = rendered.trim_end_matches('0').trim_end_matches('.');
    if rendered == "-0" {
        "0".to_string()
    } else {
        rendered.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_fee_matches_decimal() {
        assert_eq!(DEFAULT_FEE, Amount::from_num(0.01));
        assert_eq!(DEFAULT_MINING_REWARD, Amount::from_num(10));
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("30").unwrap(), Amount::from_num(30));
        assert_eq!(parse_amount(" 0.5 ").unwrap(), Amount::from_num(0.5));
        assert!(parse_amount("").is_err());
        assert!(parse_amount("thirty").is_err());
    }

    #[test]
    fn test_amount_from_f64_rejects_non_finite() {
        assert!(amount_from_f64(f64::NAN).is_err());
        assert!(amount_from_f64(f64::INFINITY).is_err());
        assert!(amount_from_f64(1e12).is_err());
        assert_eq!(amount_from_f64(100.0).unwrap(), Amount::from_num(100));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(Amount::from_num(10)), "10");
        assert_eq!(format_amount(Amount::from_num(50) - DEFAULT_FEE), "49.99");
        assert_eq!(format_amount(Amount::from_num(-2.5)), "-2.5");
        assert_eq!(format_amount(Amount::ZERO), "0");
    }
}
