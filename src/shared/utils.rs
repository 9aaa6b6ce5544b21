//! Utility functions and helpers

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Format a USD amount with cent precision
pub fn format_usd(amount: Decimal) -> String {
    let cents = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}", cents)
}

/// Parse a decimal USD string as reported by the wallet.
///
/// Unparseable values read as zero so that they fail the balance checks
/// instead of slipping through.
pub fn parse_usd(value: &str) -> Decimal {
    let cleaned: String = value
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();

    Decimal::from_str(&cleaned).unwrap_or(Decimal::ZERO)
}

/// Format an amount of a token with the given decimal count
pub fn format_token_amount(amount: Decimal, decimals: u8) -> String {
    let precision = decimals.min(9) as u32;
    let rounded = amount.round_dp_with_strategy(precision, RoundingStrategy::ToZero);
    format!("{:.*}", precision as usize, rounded)
}

/// Generate unique ID
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_usd() {
        assert_eq!(parse_usd("0.00"), Decimal::ZERO);
        assert_eq!(parse_usd("$1,250.50"), Decimal::new(125_050, 2));
        assert_eq!(parse_usd(" 42 "), Decimal::new(42, 0));
        assert_eq!(parse_usd("not a number"), Decimal::ZERO);
        assert_eq!(parse_usd("NaN"), Decimal::ZERO);
    }

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(Decimal::new(7, 0)), "7.00");
        assert_eq!(format_usd(Decimal::new(25, 1)), "2.50");
        assert_eq!(format_usd(Decimal::new(1_005, 3)), "1.01");
    }

    #[test]
    fn test_format_token_amount() {
        assert_eq!(format_token_amount(Decimal::new(5, 1), 6), "0.500000");
        assert_eq!(format_token_amount(Decimal::ONE, 18), "1.000000000");
        assert_eq!(format_token_amount(Decimal::new(1_234_567, 6), 2), "1.23");
    }
}
