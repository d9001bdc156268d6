//! Grand-total line extraction.

use regex::Regex;
use tracing::{debug, warn};

use super::rules::{ConcatenatedSplitter, DelimitedSplitter, FieldSplitter};
use super::Result;
use crate::error::ExtractionError;
use crate::models::{Fidelity, RawDocument, SourceSpan, TotalsLine};

/// Locates the document's printed totals line.
///
/// The four fields after the totals marker use the row grammar, except that
/// each may be prefixed by a yen sign. A currency code right after the totals
/// marker belongs to the totals line. Concatenated documents without yen
/// signs fall back to the right-to-left anchor split.
pub struct TotalsExtractor {
    marker: Regex,
    symbol_delimited: DelimitedSplitter,
    concatenated: ConcatenatedSplitter,
}

impl TotalsExtractor {
    pub fn new(totals_marker: &str, currency_marker: &str) -> Result<Self> {
        let totals_marker = totals_marker.trim();
        if totals_marker.is_empty() {
            return Err(ExtractionError::EmptyMarker("totals"));
        }

        let pattern = match currency_marker.trim() {
            "" => format!("(?i){}", regex::escape(totals_marker)),
            currency => format!(
                r"(?i){}(?:\s*{})?",
                regex::escape(totals_marker),
                regex::escape(currency)
            ),
        };

        Ok(Self {
            marker: Regex::new(&pattern)?,
            symbol_delimited: DelimitedSplitter::with_currency_symbols(),
            concatenated: ConcatenatedSplitter::new(),
        })
    }

    /// Every structurally valid totals line, in document order.
    pub fn extract_all(&self, doc: &RawDocument) -> Vec<TotalsLine> {
        let text = doc.text();
        let mut lines = Vec::new();
        let mut pos = 0;

        while let Some(marker) = self.marker.find_at(text, pos) {
            let tail = &text[marker.end()..];
            let split = self.symbol_delimited.split(tail).or_else(|| {
                match doc.fidelity() {
                    Fidelity::Concatenated => self.concatenated.split(tail),
                    Fidelity::Delimited => None,
                }
            });

            pos = match split {
                Some(split) => {
                    let end = marker.end() + split.len;
                    lines.push(TotalsLine {
                        amounts: split.amounts,
                        span: SourceSpan::new(marker.start(), end),
                    });
                    end
                }
                None => {
                    debug!("Totals marker at {} has no four-field group", marker.start());
                    marker.end()
                }
            };
        }

        lines
    }

    /// The document's totals line: the first valid one.
    pub fn extract(&self, doc: &RawDocument) -> Option<TotalsLine> {
        let mut lines = self.extract_all(doc).into_iter();
        let first = lines.next()?;

        let extra = lines.count();
        if extra > 0 {
            warn!(
                "Found {} additional totals lines, using the one at offset {}",
                extra, first.span.start
            );
        }

        Some(first)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn extractor() -> TotalsExtractor {
        TotalsExtractor::new("合計", "JPY").unwrap()
    }

    #[test]
    fn test_yen_prefixed_totals_on_separate_lines() {
        let doc = RawDocument::new(
            "明細\n合計\n¥335,295\n¥-49,218\n¥-7,713\n¥279,437\n",
            Fidelity::Delimited,
        );
        let totals = extractor().extract(&doc).unwrap();

        assert_eq!(totals.amounts.gross, d("335295"));
        assert_eq!(totals.amounts.commission, d("-49218"));
        assert_eq!(totals.amounts.fee, d("-7713"));
        assert_eq!(totals.amounts.net, d("279437"));
        assert!(totals.amounts.is_balanced(Decimal::ZERO));
        assert_eq!(&doc.text()[totals.span.start..totals.span.end].lines().last(), &Some("¥279,437"));
    }

    #[test]
    fn test_concatenated_totals_with_yen_signs() {
        let doc = RawDocument::new("合計¥335,295¥-49,218¥-7,713¥279,437", Fidelity::Concatenated);
        let totals = extractor().extract(&doc).unwrap();
        assert_eq!(totals.amounts.fee, d("-7713"));
    }

    #[test]
    fn test_concatenated_totals_anchor_split() {
        let doc = RawDocument::new("合計23900.00-3585-55019765.00", Fidelity::Concatenated);
        let totals = extractor().extract(&doc).unwrap();
        assert_eq!(totals.amounts.commission, d("-3585"));
        assert_eq!(totals.amounts.fee, d("-550"));
        assert_eq!(totals.amounts.net, d("19765.00"));

        // The anchor split is reserved for concatenated documents
        let doc = RawDocument::new("合計23900.00-3585-55019765.00", Fidelity::Delimited);
        assert!(extractor().extract(&doc).is_none());
    }

    #[test]
    fn test_currency_code_after_marker() {
        let doc = RawDocument::new("合計 JPY 300 -30 -15 255", Fidelity::Delimited);
        let totals = extractor().extract(&doc).unwrap();
        assert_eq!(totals.amounts.net, d("255"));
        assert_eq!(totals.span, SourceSpan::new(0, doc.text().len()));
    }

    #[test]
    fn test_absent_totals() {
        let doc = RawDocument::new("合計金額は別紙参照", Fidelity::Delimited);
        assert!(extractor().extract(&doc).is_none());
        assert!(extractor().extract_all(&doc).is_empty());
    }

    #[test]
    fn test_first_totals_line_wins() {
        let doc = RawDocument::new("合計 100 -10 -5 85\n合計 200 -20 -10 170", Fidelity::Delimited);
        assert_eq!(extractor().extract_all(&doc).len(), 2);
        assert_eq!(extractor().extract(&doc).unwrap().amounts.gross, d("100"));
    }
}
