//! Payout statement parser: segmentation, totals extraction and reconciliation.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::reconcile::reconcile;
use super::segmenter::RowSegmenter;
use super::totals::TotalsExtractor;
use super::Result;
use crate::error::{ExtractionError, ValidationError};
use crate::models::*;

/// Result of statement extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Fidelity the document was segmented with.
    pub fidelity: Fidelity,
    /// Transaction rows in document order.
    pub rows: Vec<TransactionRow>,
    /// Printed totals line, if the document has one.
    pub totals: Option<TotalsLine>,
    /// Reconciliation of the rows against the totals line.
    pub report: ReconciliationReport,
    /// Row-level and document-level issues.
    pub diagnostics: Vec<Diagnostic>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

impl ExtractionResult {
    /// Escalate a totals line that disagrees with the summed rows.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        match (self.report.totals_line_match, self.report.totals_delta) {
            (Some(false), Some(delta)) => Err(ValidationError::TotalsLineMismatch { delta }),
            _ => Ok(()),
        }
    }

    /// Diagnostics that point at a data error or a segmentation defect.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }
}

/// Trait for statement parsing.
pub trait StatementParser {
    /// Parse a statement from extracted text.
    fn parse(&self, doc: &RawDocument) -> Result<ExtractionResult>;
}

/// Parser for payout statements with one currency-marked row per transaction
/// and an optional grand-total line.
pub struct PayoutStatementParser {
    segmenter: RowSegmenter,
    totals: TotalsExtractor,
    reconcile: ReconcileConfig,
}

impl PayoutStatementParser {
    /// Create a parser with default markers and tolerances.
    pub fn new() -> Result<Self> {
        Self::from_config(&PayrecConfig::default())
    }

    /// Create a parser from configuration.
    pub fn from_config(config: &PayrecConfig) -> Result<Self> {
        Ok(Self {
            segmenter: RowSegmenter::new(&config.segment.currency_marker)?,
            totals: TotalsExtractor::new(
                &config.segment.totals_marker,
                &config.segment.currency_marker,
            )?,
            reconcile: config.reconcile.clone(),
        })
    }

    /// Set the reconciliation tolerance.
    pub fn with_epsilon(mut self, epsilon: rust_decimal::Decimal) -> Self {
        self.reconcile.epsilon = epsilon;
        self
    }

    /// Set whether rows failing the row identity count towards the sums.
    pub fn with_mismatched_rows_included(mut self, include: bool) -> Self {
        self.reconcile.include_mismatched_rows = include;
        self
    }

    /// Parse `text`, detecting its fidelity unless one is given.
    pub fn parse_text(
        &self,
        text: &str,
        fidelity: Option<Fidelity>,
    ) -> crate::Result<ExtractionResult> {
        let doc = match fidelity {
            Some(fidelity) => RawDocument::new(text, fidelity),
            None => RawDocument::detect(text),
        };
        debug!("Using {} fidelity", doc.fidelity());

        Ok(self.parse(&doc)?)
    }

    /// Parse and fail when the totals line disagrees with the summed rows.
    pub fn parse_validated(&self, doc: &RawDocument) -> crate::Result<ExtractionResult> {
        let result = self.parse(doc)?;
        result.validate()?;
        Ok(result)
    }
}

impl StatementParser for PayoutStatementParser {
    fn parse(&self, doc: &RawDocument) -> Result<ExtractionResult> {
        let start = Instant::now();

        if doc.is_empty() {
            return Err(ExtractionError::NoData);
        }

        info!(
            "Parsing {} statement from {} characters of text",
            doc.fidelity(),
            doc.text().len()
        );

        let totals = self.totals.extract(doc);
        let mut diagnostics = Vec::new();
        let mut rows = Vec::new();

        for item in self.segmenter.segment(doc) {
            match item {
                // A totals line that repeats the currency code is not a row
                Ok(row) if totals.as_ref().is_some_and(|t| t.span.overlaps(&row.span)) => {
                    debug!("Skipping row at {} inside the totals line", row.span.start);
                }
                Err(unparseable)
                    if totals
                        .as_ref()
                        .is_some_and(|t| (t.span.start..t.span.end).contains(&unparseable.offset)) => {}
                Ok(row) => rows.push(row),
                Err(unparseable) => {
                    warn!(
                        "Unparseable row at offset {}: {:?}",
                        unparseable.offset, unparseable.context
                    );
                    diagnostics.push(unparseable.into());
                }
            }
        }

        if rows.is_empty() {
            warn!("No transaction rows found");
        }

        let report = reconcile(&rows, totals.as_ref(), &self.reconcile)?;

        // reconcile has already checked every row residual for overflow
        let mismatches = report
            .mismatched_rows
            .iter()
            .filter_map(|&index| rows[index].amounts.residual().map(|r| (index, r)));
        for (index, residual) in mismatches {
            warn!("Row {} does not balance (residual {})", index, residual);
            diagnostics.push(Diagnostic::ArithmeticMismatch {
                row: Some(index),
                residual,
            });
        }

        if report.arithmetic_mismatch {
            diagnostics.push(Diagnostic::ArithmeticMismatch {
                row: None,
                residual: report.aggregate_residual,
            });
        }

        match (report.totals_line_match, report.totals_delta) {
            (None, _) => {
                debug!("No totals line found");
                diagnostics.push(Diagnostic::TotalsLineAbsent);
            }
            (Some(false), Some(delta)) => {
                warn!(
                    "Totals line mismatch: gross {}, commission {}, fee {}, net {}",
                    delta.gross, delta.commission, delta.fee, delta.net
                );
                diagnostics.push(Diagnostic::TotalsLineMismatch { delta });
            }
            _ => {}
        }

        debug!(
            "Extracted {} rows with {} diagnostics",
            rows.len(),
            diagnostics.len()
        );

        Ok(ExtractionResult {
            fidelity: doc.fidelity(),
            rows,
            totals,
            report,
            diagnostics,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}
