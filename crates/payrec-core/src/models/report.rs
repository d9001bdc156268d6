//! Reconciliation report and extraction diagnostics.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::statement::Amounts;

/// Outcome of summing the extracted rows and checking them against the
/// printed totals line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    /// Number of rows extracted.
    pub row_count: usize,

    /// Sum of gross amounts.
    pub sum_gross: Decimal,

    /// Sum of commissions (non-positive).
    pub sum_commission: Decimal,

    /// Sum of fees (non-positive).
    pub sum_fee: Decimal,

    /// Sum of net amounts.
    pub sum_net: Decimal,

    /// `sum_gross + sum_commission + sum_fee - sum_net`.
    pub aggregate_residual: Decimal,

    /// The aggregate fails the gross/deductions/net identity.
    pub arithmetic_mismatch: bool,

    /// Indices of rows that fail the identity on their own.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mismatched_rows: Vec<usize>,

    /// All four sums agree with the totals line; `None` when the document
    /// printed no totals line.
    pub totals_line_match: Option<bool>,

    /// Summed minus printed, per field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub totals_delta: Option<Amounts>,

    /// Tolerance the comparisons used.
    pub epsilon: Decimal,
}

impl ReconciliationReport {
    /// Sums as an [`Amounts`] value.
    pub fn sums(&self) -> Amounts {
        Amounts {
            gross: self.sum_gross,
            commission: self.sum_commission,
            fee: self.sum_fee,
            net: self.sum_net,
        }
    }

    /// Largest absolute per-field difference from the totals line.
    pub fn totals_mismatch_magnitude(&self) -> Option<Decimal> {
        self.totals_delta.map(|delta| delta.max_abs())
    }

    /// Whether anything in the report needs attention.
    pub fn is_clean(&self) -> bool {
        !self.arithmetic_mismatch
            && self.mismatched_rows.is_empty()
            && self.totals_line_match != Some(false)
    }
}

/// A non-fatal issue found while extracting a statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A currency marker without a valid four-field group after it.
    UnparseableRow {
        /// Byte offset of the marker.
        offset: usize,
        /// Text following the marker, for the reader.
        context: String,
    },

    /// A row (or, with `row: None`, the aggregate) fails
    /// `gross + commission + fee == net`.
    ArithmeticMismatch { row: Option<usize>, residual: Decimal },

    /// The document has no grand-total line.
    TotalsLineAbsent,

    /// The grand-total line disagrees with the summed rows.
    TotalsLineMismatch { delta: Amounts },
}

impl Diagnostic {
    /// Whether this diagnostic signals a likely segmentation defect.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::ArithmeticMismatch { .. } | Self::TotalsLineMismatch { .. }
        )
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnparseableRow { offset, context } => {
                write!(f, "unparseable row at offset {offset}: {context:?}")
            }
            Self::ArithmeticMismatch { row: Some(row), residual } => {
                write!(f, "row {row} does not balance (residual {residual})")
            }
            Self::ArithmeticMismatch { row: None, residual } => {
                write!(f, "row sums do not balance (residual {residual})")
            }
            Self::TotalsLineAbsent => write!(f, "no totals line found"),
            Self::TotalsLineMismatch { delta } => write!(
                f,
                "totals line mismatch: gross {}, commission {}, fee {}, net {}",
                delta.gross, delta.commission, delta.fee, delta.net
            ),
        }
    }
}
