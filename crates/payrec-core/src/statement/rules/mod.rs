//! Rule-based field splitters for payout statement rows.

pub mod amounts;
pub mod concatenated;
pub mod delimited;
pub mod patterns;

pub use amounts::{format_amount, parse_amount};
pub use concatenated::ConcatenatedSplitter;
pub use delimited::DelimitedSplitter;

use crate::models::Amounts;

/// Trait for splitting the text after a marker into four numeric fields.
pub trait FieldSplitter {
    /// Split the four-field group at the start of `tail`.
    ///
    /// `tail` is the document text immediately following a marker. Returns
    /// `None` when no structurally valid group starts there.
    fn split(&self, tail: &str) -> Option<SplitMatch>;
}

/// A four-field group recognized after a marker.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitMatch {
    /// Parsed fields.
    pub amounts: Amounts,
    /// Field text in gross, commission, fee, net order.
    pub raw: [String; 4],
    /// Bytes of `tail` consumed, leading whitespace included.
    pub len: usize,
}

impl SplitMatch {
    /// A match whose row identity can be evaluated; `None` when the amounts
    /// are too large for exact arithmetic.
    pub fn new(amounts: Amounts, raw: [String; 4], len: usize) -> Option<Self> {
        amounts.residual()?;
        Some(Self { amounts, raw, len })
    }
}
