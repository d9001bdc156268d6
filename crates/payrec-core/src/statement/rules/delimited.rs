//! Splitter for whitespace-preserving extraction output.

use regex::Regex;

use super::patterns::{is_run_char, DELIMITED_GROUP, SYMBOL_DELIMITED_GROUP};
use super::{parse_amount, FieldSplitter, SplitMatch};
use crate::models::Amounts;

/// Splits four whitespace-separated numeric tokens.
///
/// Whitespace is the field delimiter, so this case is unambiguous.
pub struct DelimitedSplitter {
    pattern: &'static Regex,
}

impl DelimitedSplitter {
    /// Create a splitter for plain whitespace-separated tokens.
    pub fn new() -> Self {
        Self {
            pattern: &DELIMITED_GROUP,
        }
    }

    /// Also accept a yen sign before each token, as printed on totals lines.
    pub fn with_currency_symbols() -> Self {
        Self {
            pattern: &SYMBOL_DELIMITED_GROUP,
        }
    }
}

impl Default for DelimitedSplitter {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldSplitter for DelimitedSplitter {
    fn split(&self, tail: &str) -> Option<SplitMatch> {
        let caps = self.pattern.captures(tail)?;
        let end = caps.get(0)?.end();

        // The net token must end the numeric run: `85.129` is not `85.12`
        if tail[end..].chars().next().is_some_and(is_run_char) {
            return None;
        }

        let raw = [1, 2, 3, 4].map(|i| caps[i].to_string());
        let gross = parse_amount(&raw[0])?;
        let commission = parse_amount(&raw[1])?;
        let fee = parse_amount(&raw[2])?;
        let net = parse_amount(&raw[3])?;

        SplitMatch::new(Amounts::new(gross, commission, fee, net), raw, end)
    }
}
