//! Reading money amounts out of free-form text.
//!
//! Accepts the shapes people actually type: `$12.50`, `12,50€`,
//! `1.234,56 kr`, `1,234.56`. Separators more than two characters from the
//! end of the number are thousands separators and are dropped. A comma left
//! near the end is a decimal comma.

use crate::core::currency::CurrencyKey;
use crate::core::item::NormalizeError;
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

lazy_static! {
    /// Prefix, numeric token, suffix. Unanchored: the first number wins.
    static ref AMOUNT_REGEX: Regex =
        Regex::new(r"([^0-9.-]*)([.]?[0-9][0-9,.]*)([^0-9.-]*)")
            .expect("Invalid regex pattern");
}

/// An amount with its currency markers, before it is attached to an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAmount {
    pub amount: Decimal,
    pub currency: CurrencyKey,
}

/// Parse a user-entered amount.
///
/// # Examples
///
/// ```
/// use tabulator::normalize::amount::parse_amount;
/// use rust_decimal_macros::dec;
///
/// let parsed = parse_amount("1.234,56€").unwrap();
/// assert_eq!(parsed.amount, dec!(1234.56));
/// assert_eq!(parsed.currency.symbol_after(), "€");
/// ```
pub fn parse_amount(raw_text: &str) -> Result<ParsedAmount, NormalizeError> {
    let caps = AMOUNT_REGEX
        .captures(raw_text)
        .ok_or_else(|| NormalizeError::InvalidAmount(raw_text.to_string()))?;

    let prefix = caps.get(1).map_or("", |m| m.as_str());
    let token = caps.get(2).map_or("", |m| m.as_str());
    let suffix = caps.get(3).map_or("", |m| m.as_str());

    let normalized = normalize_separators(token);
    log::debug!("Normalized value {:?} as {:?}", token, normalized);

    let amount = parse_decimal(&normalized, raw_text)?;

    Ok(ParsedAmount {
        amount,
        currency: CurrencyKey::new(prefix, suffix),
    })
}

/// Drop thousands separators, then turn a decimal comma into a point.
///
/// A `,` or `.` survives only when at most two characters follow it.
fn normalize_separators(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    let len = chars.len();
    let kept: String = chars
        .iter()
        .enumerate()
        .filter(|(i, c)| !matches!(c, ',' | '.') || len - i <= 3)
        .map(|(_, c)| *c)
        .collect();
    kept.replacen(',', ".", 1)
}

/// A well-formed number that `Decimal` cannot hold is out of range, not
/// invalid. It is reported as `Decimal::MAX`.
fn parse_decimal(s: &str, raw_text: &str) -> Result<Decimal, NormalizeError> {
    let mut s = s.to_string();
    if s.starts_with('.') {
        s.insert(0, '0');
    }
    if s.ends_with('.') {
        s.pop();
    }
    Decimal::from_str(&s).map_err(|_| {
        let well_formed = s.chars().all(|c| c.is_ascii_digit() || c == '.')
            && s.matches('.').count() <= 1;
        if well_formed {
            NormalizeError::AmountOutOfRange(Decimal::MAX)
        } else {
            NormalizeError::InvalidAmount(raw_text.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_dollar_prefix() {
        let parsed = parse_amount("$12.50").unwrap();
        assert_eq!(parsed.amount, dec!(12.50));
        assert_eq!(parsed.currency, CurrencyKey::before("$"));
    }

    #[test]
    fn test_decimal_comma_suffix() {
        let parsed = parse_amount("12,50€").unwrap();
        assert_eq!(parsed.amount, dec!(12.50));
        assert_eq!(parsed.currency, CurrencyKey::after("€"));
    }

    #[test]
    fn test_thousands_comma() {
        assert_eq!(parse_amount("1,234.56").unwrap().amount, dec!(1234.56));
        assert_eq!(parse_amount("1,234").unwrap().amount, dec!(1234));
        assert_eq!(parse_amount("1,234,567").unwrap().amount, dec!(1234567));
    }

    #[test]
    fn test_thousands_point_with_decimal_comma() {
        assert_eq!(parse_amount("1.234,56").unwrap().amount, dec!(1234.56));
        assert_eq!(parse_amount("1.234.567,8").unwrap().amount, dec!(1234567.8));
    }

    #[test]
    fn test_no_number() {
        assert_eq!(
            parse_amount("abc"),
            Err(NormalizeError::InvalidAmount("abc".to_string()))
        );
        assert!(parse_amount("").is_err());
    }

    #[test]
    fn test_leading_point() {
        let parsed = parse_amount(".5").unwrap();
        assert_eq!(parsed.amount, dec!(0.5));
        assert_eq!(parsed.currency, CurrencyKey::bare());
    }

    #[test]
    fn test_trailing_point() {
        assert_eq!(parse_amount("12.").unwrap().amount, dec!(12));
    }

    #[test]
    fn test_both_markers_keeps_prefix() {
        let parsed = parse_amount(" $ 7 USD ").unwrap();
        assert_eq!(parsed.amount, dec!(7));
        assert_eq!(parsed.currency, CurrencyKey::before("$"));
    }

    #[test]
    fn test_word_suffix_is_trimmed() {
        let parsed = parse_amount("12.50 kr").unwrap();
        assert_eq!(parsed.currency, CurrencyKey::after("kr"));
    }

    #[test]
    fn test_minus_sign_is_not_part_of_amount() {
        let parsed = parse_amount("-5").unwrap();
        assert_eq!(parsed.amount, dec!(5));
        assert_eq!(parsed.currency, CurrencyKey::bare());
    }

    #[test]
    fn test_two_separators_in_tail_is_invalid() {
        assert!(matches!(
            parse_amount("12.,5"),
            Err(NormalizeError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_amount_beyond_decimal_is_out_of_range() {
        assert_eq!(
            parse_amount("$100000000000000000000000000000"),
            Err(NormalizeError::AmountOutOfRange(Decimal::MAX))
        );
        assert_eq!(
            parse_amount("100.000.000.000.000.000.000.000.000.000,50 €"),
            Err(NormalizeError::AmountOutOfRange(Decimal::MAX))
        );
    }

    #[test]
    fn test_separator_rule() {
        assert_eq!(normalize_separators("12,50"), "12.50");
        assert_eq!(normalize_separators("1.234,56"), "1234.56");
        assert_eq!(normalize_separators("1,2"), "1.2");
        assert_eq!(normalize_separators("1000"), "1000");
    }
}
