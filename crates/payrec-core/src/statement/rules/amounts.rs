//! Amount parsing and formatting.

use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a statement amount token (e.g. "18,900.00", "-2,835", "¥279,437").
///
/// Grouping commas, currency signs and whitespace are dropped; the sign is kept.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    if cleaned.is_empty() || cleaned == "-" {
        return None;
    }

    Decimal::from_str(&cleaned).ok()
}

/// Format an amount with comma thousand separators ("-1,234.56").
pub fn format_amount(amount: Decimal) -> String {
    let s = amount.to_string();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.as_str()),
    };
    let (integer_part, fraction) = match digits.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (digits, None),
    };

    let chars: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::from(sign);

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(*c);
    }

    if let Some(fraction) = fraction {
        formatted.push('.');
        formatted.push_str(fraction);
    }

    formatted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("18,900.00"), Some(Decimal::from_str("18900.00").unwrap()));
        assert_eq!(parse_amount("-2,835"), Some(Decimal::from_str("-2835").unwrap()));
        assert_eq!(parse_amount("¥279,437"), Some(Decimal::from_str("279437").unwrap()));
        assert_eq!(parse_amount("￥-7,713"), Some(Decimal::from_str("-7713").unwrap()));
        assert_eq!(parse_amount("-"), None);
        assert_eq!(parse_amount("JPY"), None);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(Decimal::from_str("335295").unwrap()), "335,295");
        assert_eq!(format_amount(Decimal::from_str("-49218").unwrap()), "-49,218");
        assert_eq!(format_amount(Decimal::from_str("15630.00").unwrap()), "15,630.00");
        assert_eq!(format_amount(Decimal::from_str("999.5").unwrap()), "999.5");
    }
}
