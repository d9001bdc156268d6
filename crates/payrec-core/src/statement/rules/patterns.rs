//! Common regex patterns for payout statement extraction.
//!
//! Numeric tokens follow `-?digits(,digits)*(.digits{1,2})?`. Gross and net
//! never carry a sign; commission and fee may.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Whitespace-delimited four-field group right after a marker
    pub static ref DELIMITED_GROUP: Regex = Regex::new(concat!(
        r"\A\s*",
        r"(\d+(?:,\d+)*(?:\.\d{1,2})?)\s+",
        r"(-?\d+(?:,\d+)*(?:\.\d{1,2})?)\s+",
        r"(-?\d+(?:,\d+)*(?:\.\d{1,2})?)\s+",
        r"(\d+(?:,\d+)*(?:\.\d{1,2})?)",
    )).unwrap();

    // Same group where each token may carry a yen sign (totals lines)
    pub static ref SYMBOL_DELIMITED_GROUP: Regex = Regex::new(concat!(
        r"\A[\s¥￥]*",
        r"(\d+(?:,\d+)*(?:\.\d{1,2})?)[\s¥￥]+",
        r"(-?\d+(?:,\d+)*(?:\.\d{1,2})?)[\s¥￥]+",
        r"(-?\d+(?:,\d+)*(?:\.\d{1,2})?)[\s¥￥]+",
        r"(\d+(?:,\d+)*(?:\.\d{1,2})?)",
    )).unwrap();

    // Gross amount in a concatenated run: must end with .NN
    pub static ref DECIMAL_AMOUNT: Regex = Regex::new(
        r"\A\d+(?:,\d+)*\.\d{2}\z"
    ).unwrap();

    // Unsigned integer magnitude with optional grouping
    pub static ref INTEGER_AMOUNT: Regex = Regex::new(
        r"\A\d+(?:,\d+)*\z"
    ).unwrap();


    // Decimal amount fused with two deductions: "18900.00-2835-4"
    pub static ref CONCATENATED_SIGNATURE: Regex = Regex::new(
        r"\d\.\d{2}-\d+(?:,\d+)*-\d"
    ).unwrap();
}

/// Characters that may appear inside a concatenated four-field run.
pub fn is_run_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, ',' | '.' | '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delimited_group_rejects_signed_gross() {
        assert!(DELIMITED_GROUP.is_match(" 100 -10 -5 85"));
        assert!(!DELIMITED_GROUP.is_match(" -100 -10 -5 85"));
        assert!(!DELIMITED_GROUP.is_match("18900.00-2835-43515630.00"));
    }

    #[test]
    fn test_symbol_group() {
        let caps = SYMBOL_DELIMITED_GROUP
            .captures("\n¥335,295\n¥-49,218\n¥-7,713\n¥279,437")
            .unwrap();
        assert_eq!(&caps[2], "-49,218");
        assert_eq!(&caps[4], "279,437");
    }
}
