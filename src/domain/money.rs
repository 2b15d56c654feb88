use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

/// Amounts are exact decimals, so summing never drifts the way floats do.
/// The ledger is currency-agnostic: an amount is just a magnitude.
pub type Amount = Decimal;

/// Format an amount for display with exactly two decimals.
/// Example: 250.5 -> "250.50", 12 -> "12.00", 0.005 -> "0.01"
pub fn format_amount(amount: Amount) -> String {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded.to_string()
}

/// Parse a plain decimal string into an amount.
/// Example: "250.50" -> 250.50, "10" -> 10, "-5" -> -5
///
/// Only an optional sign, digits and a single decimal point are accepted.
/// Exponents, `NaN`, `inf` and trailing text are rejected.
pub fn parse_amount(input: &str) -> Result<Amount, ParseAmountError> {
    let input = input.trim();
    let unsigned = input
        .strip_prefix('-')
        .or_else(|| input.strip_prefix('+'))
        .unwrap_or(input);

    if unsigned.is_empty() || !unsigned.bytes().any(|b| b.is_ascii_digit()) {
        return Err(ParseAmountError::InvalidFormat);
    }
    if !unsigned.bytes().all(|b| b.is_ascii_digit() || b == b'.')
        || unsigned.bytes().filter(|b| *b == b'.').count() > 1
    {
        return Err(ParseAmountError::InvalidFormat);
    }

    let magnitude = Decimal::from_str(unsigned).map_err(|_| ParseAmountError::OutOfRange)?;
    Ok(if input.starts_with('-') {
        -magnitude
    } else {
        magnitude
    })
}

/// Serde adapter writing an amount as a JSON number with its exact digits.
///
/// Requires `serde_json`'s `arbitrary_precision` feature, so no amount passes
/// through `f64` on its way to or from storage.
pub mod amount_json {
    use std::str::FromStr;

    use serde::de::Error as _;
    use serde::ser::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use serde_json::Number;

    use super::Amount;

    pub fn serialize<S: Serializer>(amount: &Amount, serializer: S) -> Result<S::Ok, S::Error> {
        let number = Number::from_str(&amount.to_string()).map_err(S::Error::custom)?;
        number.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Amount, D::Error> {
        let number = Number::deserialize(deserializer)?;
        let text = number.to_string();
        Amount::from_str(&text)
            .or_else(|_| Amount::from_scientific(&text))
            .map_err(|_| D::Error::custom(format!("amount {} is out of range", text)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseAmountError {
    InvalidFormat,
    OutOfRange,
}

impl fmt::Display for ParseAmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseAmountError::InvalidFormat => write!(f, "invalid amount format"),
            ParseAmountError::OutOfRange => write!(f, "amount out of range"),
        }
    }
}

impl std::error::Error for ParseAmountError {}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(dec!(250.5)), "250.50");
        assert_eq!(format_amount(dec!(250.50)), "250.50");
        assert_eq!(format_amount(dec!(12)), "12.00");
        assert_eq!(format_amount(dec!(0.01)), "0.01");
        assert_eq!(format_amount(dec!(0.005)), "0.01");
        assert_eq!(format_amount(dec!(0)), "0.00");
        assert_eq!(format_amount(dec!(99.999)), "100.00");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("250.50"), Ok(dec!(250.50)));
        assert_eq!(parse_amount("10"), Ok(dec!(10)));
        assert_eq!(parse_amount("  42.1 "), Ok(dec!(42.1)));
        assert_eq!(parse_amount("-5"), Ok(dec!(-5)));
        assert_eq!(parse_amount("+7.25"), Ok(dec!(7.25)));
        assert_eq!(parse_amount("0"), Ok(dec!(0)));
    }

    #[test]
    fn test_parse_amount_out_of_range() {
        assert_eq!(
            parse_amount("79228162514264337593543950335"),
            Ok(Decimal::MAX)
        );
        assert_eq!(
            parse_amount("79228162514264337593543950336"),
            Err(ParseAmountError::OutOfRange)
        );
        assert_eq!(
            parse_amount("100000000000000000000000000000"),
            Err(ParseAmountError::OutOfRange)
        );
    }

    #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Wire(#[serde(with = "amount_json")] Amount);

    #[test]
    fn test_amount_json_keeps_exact_digits() {
        for raw in [
            "250.50",
            "1.0000000000000001",
            "12345678901234567.89",
            "99999999999999999999",
            "79228162514264337593543950335",
        ] {
            let amount = parse_amount(raw).unwrap();
            let json = serde_json::to_string(&Wire(amount)).unwrap();
            assert_eq!(json, raw);

            let back: Wire = serde_json::from_str(&json).unwrap();
            assert_eq!(back.0.to_string(), raw);
        }
    }

    #[test]
    fn test_amount_json_reads_floats_and_exponents() {
        let from_float: Wire = serde_json::from_str("12.5").unwrap();
        assert_eq!(from_float.0, dec!(12.5));

        let from_exponent: Wire = serde_json::from_str("1.5e2").unwrap();
        assert_eq!(from_exponent.0, dec!(150));

        assert!(serde_json::from_str::<Wire>("\"12\"").is_err());
    }

    #[test]
    fn test_parse_amount_invalid() {
        assert!(parse_amount("").is_err());
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("12abc").is_err());
        assert!(parse_amount("12.34.56").is_err());
        assert!(parse_amount("1e3").is_err());
        assert!(parse_amount("NaN").is_err());
        assert!(parse_amount("inf").is_err());
        assert!(parse_amount("-").is_err());
        assert!(parse_amount(".").is_err());
    }
}
