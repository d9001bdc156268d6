//! Reconciliation of extracted rows against the printed totals line.

use super::Result;
use crate::error::ExtractionError;
use crate::models::{Amounts, ReconcileConfig, ReconciliationReport, TotalsLine, TransactionRow};

/// Sum `rows` and compare them with `totals`.
///
/// Pure: the report is derived from the inputs alone. Sums use exact decimal
/// arithmetic. Rows that fail `gross + commission + fee == net` are listed in
/// `mismatched_rows` and, unless the config says otherwise, still summed.
///
/// Fails with [`ExtractionError::Overflow`] when a sum leaves the `Decimal`
/// range.
pub fn reconcile(
    rows: &[TransactionRow],
    totals: Option<&TotalsLine>,
    config: &ReconcileConfig,
) -> Result<ReconciliationReport> {
    let epsilon = config.epsilon;
    let mut mismatched_rows = Vec::new();
    let mut sums = Amounts::default();

    for (index, row) in rows.iter().enumerate() {
        let residual = row
            .amounts
            .residual()
            .ok_or(ExtractionError::Overflow("row residual"))?;

        let balanced = residual.abs() <= epsilon;
        if !balanced {
            mismatched_rows.push(index);
        }
        if balanced || config.include_mismatched_rows {
            sums = sums
                .checked_add(&row.amounts)
                .ok_or(ExtractionError::Overflow("row sums"))?;
        }
    }

    let aggregate_residual = sums
        .residual()
        .ok_or(ExtractionError::Overflow("aggregate residual"))?;
    let totals_delta = totals
        .map(|line| {
            sums.checked_sub(&line.amounts)
                .ok_or(ExtractionError::Overflow("totals delta"))
        })
        .transpose()?;
    let totals_line_match = totals_delta.map(|delta| delta.max_abs() <= epsilon);

    Ok(ReconciliationReport {
        row_count: rows.len(),
        sum_gross: sums.gross,
        sum_commission: sums.commission,
        sum_fee: sums.fee,
        sum_net: sums.net,
        aggregate_residual,
        arithmetic_mismatch: aggregate_residual.abs() > epsilon,
        mismatched_rows,
        totals_line_match,
        totals_delta,
        epsilon,
    })
}
