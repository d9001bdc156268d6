//! Transaction row segmentation.

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::rules::{ConcatenatedSplitter, DelimitedSplitter, FieldSplitter};
use super::Result;
use crate::error::ExtractionError;
use crate::models::{Diagnostic, Fidelity, RawDocument, SourceSpan, TransactionRow};

/// Characters of context kept for an unparseable marker.
const CONTEXT_CHARS: usize = 32;

/// A currency marker that is not followed by a valid four-field group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnparseableRow {
    /// Byte offset of the marker.
    pub offset: usize,
    /// Marker and the text following it, up to the end of the line and at
    /// most `CONTEXT_CHARS` characters.
    pub context: String,
}

impl From<UnparseableRow> for Diagnostic {
    fn from(row: UnparseableRow) -> Self {
        Diagnostic::UnparseableRow {
            offset: row.offset,
            context: row.context,
        }
    }
}

/// Materialized output of [`RowSegmenter::segment_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segmentation {
    pub rows: Vec<TransactionRow>,
    pub unparseable: Vec<UnparseableRow>,
}

/// Finds transaction rows by their currency marker and splits each into
/// gross, commission, fee and net.
pub struct RowSegmenter {
    marker: Regex,
    delimited: DelimitedSplitter,
    concatenated: ConcatenatedSplitter,
}

impl RowSegmenter {
    /// Create a segmenter for rows introduced by `currency_marker`
    /// (matched case-insensitively).
    pub fn new(currency_marker: &str) -> Result<Self> {
        let currency_marker = currency_marker.trim();
        if currency_marker.is_empty() {
            return Err(ExtractionError::EmptyMarker("currency"));
        }

        Ok(Self {
            marker: Regex::new(&format!("(?i){}", regex::escape(currency_marker)))?,
            delimited: DelimitedSplitter::new(),
            concatenated: ConcatenatedSplitter::new(),
        })
    }

    fn splitter(&self, fidelity: Fidelity) -> &dyn FieldSplitter {
        match fidelity {
            Fidelity::Delimited => &self.delimited,
            Fidelity::Concatenated => &self.concatenated,
        }
    }

    /// Lazily segment `doc` into rows, in document order.
    ///
    /// The iterator is `Clone`, so a sequence can be replayed from any point.
    pub fn segment<'a>(&'a self, doc: &'a RawDocument) -> Rows<'a> {
        Rows {
            segmenter: self,
            doc,
            pos: 0,
        }
    }

    /// Segment `doc` and collect rows and unparseable markers.
    pub fn segment_all(&self, doc: &RawDocument) -> Segmentation {
        let mut result = Segmentation::default();

        for item in self.segment(doc) {
            match item {
                Ok(row) => result.rows.push(row),
                Err(unparseable) => result.unparseable.push(unparseable),
            }
        }

        debug!(
            "Segmented {} rows ({} unparseable markers) from {} document",
            result.rows.len(),
            result.unparseable.len(),
            doc.fidelity()
        );

        result
    }
}

/// Lazy row sequence returned by [`RowSegmenter::segment`].
#[derive(Clone)]
pub struct Rows<'a> {
    segmenter: &'a RowSegmenter,
    doc: &'a RawDocument,
    pos: usize,
}

impl Iterator for Rows<'_> {
    type Item = std::result::Result<TransactionRow, UnparseableRow>;

    fn next(&mut self) -> Option<Self::Item> {
        let text = self.doc.text();
        let marker = self.segmenter.marker.find_at(text, self.pos)?;
        let tail = &text[marker.end()..];

        match self.segmenter.splitter(self.doc.fidelity()).split(tail) {
            Some(split) => {
                let end = marker.end() + split.len;
                self.pos = end;
                trace!(start = marker.start(), end, "row {:?}", split.raw);

                Some(Ok(TransactionRow {
                    amounts: split.amounts,
                    span: SourceSpan::new(marker.start(), end),
                    raw: split.raw,
                }))
            }
            None => {
                self.pos = marker.end();
                let context: String = text[marker.start()..]
                    .lines()
                    .next()
                    .unwrap_or_default()
                    .chars()
                    .take(CONTEXT_CHARS)
                    .collect();

                Some(Err(UnparseableRow {
                    offset: marker.start(),
                    context,
                }))
            }
        }
    }
}
