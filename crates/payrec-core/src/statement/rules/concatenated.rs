//! Splitter for whitespace-collapsed extraction output.
//!
//! The backend renders a row as `<gross><commission><fee><net>` with nothing
//! in between, e.g. `18900.00-2835-43515630.00`. Decimal points and minus
//! signs are the only anchors, so the run is decomposed from the right:
//!
//! 1. a `.NN` ends `net`: the rightmost one for which the steps below
//!    succeed, so text glued after the row (a dotted date, say) is skipped;
//! 2. the digits left of it, back to the nearest `-`, hold `fee` and the
//!    integer part of `net` fused together;
//! 3. the digits back to the previous `-` are `commission`;
//! 4. the rest, which must itself end in `.NN`, is `gross`.
//!
//! Nothing in the text separates `fee` from `net`. The boundary is the split
//! point that best satisfies `gross + commission + fee == net`; ties go to
//! the shortest fee.

use rust_decimal::Decimal;
use tracing::trace;

use super::patterns::{is_run_char, DECIMAL_AMOUNT, INTEGER_AMOUNT};
use super::{parse_amount, FieldSplitter, SplitMatch};
use crate::models::Amounts;

/// Splits a four-field run that has no separating whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConcatenatedSplitter;

impl ConcatenatedSplitter {
    pub fn new() -> Self {
        Self
    }
}

/// Byte indices of every `.` followed by two digits and preceded by one,
/// rightmost first.
fn decimal_points(run: &str) -> impl Iterator<Item = usize> + '_ {
    let bytes = run.as_bytes();
    (1..bytes.len().saturating_sub(2)).rev().filter(move |&i| {
        bytes[i] == b'.'
            && bytes[i - 1].is_ascii_digit()
            && bytes[i + 1].is_ascii_digit()
            && bytes[i + 2].is_ascii_digit()
    })
}

/// Choose the fee/net boundary inside the fused digit run.
///
/// Returns `(fee_digits, net_integer_digits, fee, net)`.
fn split_fee_net(
    gross: Decimal,
    commission: Decimal,
    fused: &str,
    net_fraction: &str,
) -> Option<(String, String, Decimal, Decimal)> {
    let digits: String = fused.chars().filter(|c| c.is_ascii_digit()).collect();
    let mut best: Option<(Decimal, String, String, Decimal, Decimal)> = None;

    for k in 1..digits.len() {
        let (fee_digits, net_digits) = digits.split_at(k);
        if (fee_digits.len() > 1 && fee_digits.starts_with('0'))
            || (net_digits.len() > 1 && net_digits.starts_with('0'))
        {
            continue;
        }

        let (Some(fee), Some(net)) = (
            parse_amount(fee_digits),
            parse_amount(&format!("{net_digits}.{net_fraction}")),
        ) else {
            continue;
        };

        let Some(residual) = Amounts::new(gross, commission, fee, net).residual() else {
            continue;
        };
        let residual = residual.abs();
        trace!(fee = %fee, net = %net, residual = %residual, "fee/net candidate");

        if best.as_ref().is_none_or(|b| residual < b.0) {
            best = Some((residual, fee_digits.to_string(), net_digits.to_string(), fee, net));
        }
    }

    best.map(|(_, fee_digits, net_digits, fee, net)| (fee_digits, net_digits, fee, net))
}

/// Decompose `run[..net_dot + 3]`, with `net_dot` the decimal point of `net`.
fn decompose(run: &str, net_dot: usize) -> Option<(Amounts, [String; 4])> {
    let net_fraction = &run[net_dot + 1..net_dot + 3];

    // Right-to-left: fee's minus sign, then commission's
    let head = &run[..net_dot];
    let fee_minus = head.rfind('-')?;
    let fused = &head[fee_minus + 1..];
    let head = &head[..fee_minus];
    let commission_minus = head.rfind('-')?;
    let commission_text = &head[commission_minus + 1..];
    let gross_text = &head[..commission_minus];

    if !DECIMAL_AMOUNT.is_match(gross_text)
        || !INTEGER_AMOUNT.is_match(commission_text)
        || !INTEGER_AMOUNT.is_match(fused)
    {
        return None;
    }

    let gross = parse_amount(gross_text)?;
    let commission = -parse_amount(commission_text)?;
    let (fee_digits, net_digits, fee, net) =
        split_fee_net(gross, commission, fused, net_fraction)?;

    Some((
        Amounts::new(gross, commission, fee, net),
        [
            gross_text.to_string(),
            format!("-{commission_text}"),
            format!("-{fee_digits}"),
            format!("{net_digits}.{net_fraction}"),
        ],
    ))
}

impl FieldSplitter for ConcatenatedSplitter {
    fn split(&self, tail: &str) -> Option<SplitMatch> {
        let lead = tail.len() - tail.trim_start().len();
        let body = &tail[lead..];
        let run_len: usize = body
            .chars()
            .take_while(|c| is_run_char(*c))
            .map(char::len_utf8)
            .sum();
        let run = &body[..run_len];

        let (net_dot, (amounts, raw)) = decimal_points(run)
            .find_map(|dot| decompose(run, dot).map(|parts| (dot, parts)))?;

        SplitMatch::new(amounts, raw, lead + net_dot + 3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn split(s: &str) -> Option<SplitMatch> {
        ConcatenatedSplitter::new().split(s)
    }

    #[test]
    fn test_right_anchored_decomposition() {
        let m = split("18900.00-2835-43515630.00").unwrap();

        assert_eq!(m.amounts.gross, d("18900.00"));
        assert_eq!(m.amounts.commission, d("-2835"));
        assert_eq!(m.amounts.fee, d("-435"));
        assert_eq!(m.amounts.net, d("15630.00"));
        assert_eq!(m.raw, ["18900.00", "-2835", "-435", "15630.00"].map(String::from));
        assert_eq!(m.len, "18900.00-2835-43515630.00".len());
    }

    #[test]
    fn test_stops_at_next_row() {
        let text = "5000.00-750-1154135.00JPY18900.00-2835-43515630.00";
        let m = split(text).unwrap();
        assert_eq!(m.amounts.fee, d("-115"));
        assert_eq!(m.amounts.net, d("4135.00"));
        assert_eq!(&text[m.len..m.len + 3], "JPY");
    }

    #[test]
    fn test_trailing_digits_left_unconsumed() {
        // A date glued after the row: only the first two decimals belong to net
        let text = "18900.00-2835-43515630.002024";
        let m = split(text).unwrap();
        assert_eq!(m.amounts.net, d("15630.00"));
        assert_eq!(&text[m.len..], "2024");
    }

    #[test]
    fn test_dotted_date_after_net() {
        let text = "18900.00-2835-43515630.002024.01.06JPY";
        let m = split(text).unwrap();
        assert_eq!(m.amounts.fee, d("-435"));
        assert_eq!(m.amounts.net, d("15630.00"));
        assert_eq!(&text[m.len..], "2024.01.06JPY");
    }

    #[test]
    fn test_overflowing_row_rejected() {
        // Fits the grammar, but the row identity cannot be evaluated
        let max = "79228162514264337593543950335";
        assert!(split(&format!("0.00-{max}-{max}0.00")).is_none());
    }

    #[test]
    fn test_grouping_commas() {
        let m = split(" 18,900.00-2,835-43515,630.00").unwrap();
        assert_eq!(m.amounts.gross, d("18900.00"));
        assert_eq!(m.amounts.commission, d("-2835"));
        assert_eq!(m.amounts.fee, d("-435"));
        assert_eq!(m.amounts.net, d("15630.00"));
    }

    #[test]
    fn test_unbalanced_row_picks_closest_split() {
        // 1000 - 100 - 50 = 850, printed net 851
        let m = split("1000.00-100-50851.00").unwrap();
        assert_eq!(m.amounts.fee, d("-50"));
        assert_eq!(m.amounts.net, d("851.00"));
        assert_eq!(m.amounts.residual(), Some(d("-1")));
    }

    #[test]
    fn test_rejects_missing_minus_signs() {
        assert!(split("18900.00-283543515630.00").is_none());
        assert!(split("18900.0015630.00").is_none());
        assert!(split("18900.00-2835-435").is_none());
    }

    #[test]
    fn test_rejects_gross_without_decimals() {
        assert!(split("18900-2835-43515630.00").is_none());
        assert!(split(" total amount").is_none());
        assert!(split("").is_none());
    }
}
