//! Payout statement data models: amounts, transaction rows and the totals line.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The four monetary fields shared by rows, totals lines and report sums.
///
/// Commission and fee are deductions and are kept non-positive, so a balanced
/// record satisfies `gross + commission + fee == net`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amounts {
    /// Gross sales amount.
    pub gross: Decimal,
    /// Platform commission (non-positive).
    pub commission: Decimal,
    /// Payment service fee (non-positive).
    pub fee: Decimal,
    /// Net payout.
    pub net: Decimal,
}

impl Amounts {
    /// Build amounts, normalizing deductions to non-positive values.
    ///
    /// Some renderings print commission and fee without a minus sign; those
    /// are treated as magnitudes of a deduction.
    pub fn new(gross: Decimal, commission: Decimal, fee: Decimal, net: Decimal) -> Self {
        Self {
            gross,
            commission: deduction(commission),
            fee: deduction(fee),
            net,
        }
    }

    /// `gross + commission + fee - net`; zero for a balanced record.
    ///
    /// `None` when the arithmetic leaves the `Decimal` range.
    pub fn residual(&self) -> Option<Decimal> {
        self.gross
            .checked_add(self.commission)?
            .checked_add(self.fee)?
            .checked_sub(self.net)
    }

    /// Whether the record balances within `epsilon`.
    pub fn is_balanced(&self, epsilon: Decimal) -> bool {
        self.residual().is_some_and(|r| r.abs() <= epsilon)
    }

    /// Whether every field of `self` is within `epsilon` of `other`.
    pub fn matches(&self, other: &Amounts, epsilon: Decimal) -> bool {
        self.checked_sub(other)
            .is_some_and(|delta| delta.max_abs() <= epsilon)
    }

    /// Field-wise sum, `None` on overflow.
    pub fn checked_add(&self, rhs: &Amounts) -> Option<Amounts> {
        Some(Amounts {
            gross: self.gross.checked_add(rhs.gross)?,
            commission: self.commission.checked_add(rhs.commission)?,
            fee: self.fee.checked_add(rhs.fee)?,
            net: self.net.checked_add(rhs.net)?,
        })
    }

    /// Field-wise difference, `None` on overflow.
    pub fn checked_sub(&self, rhs: &Amounts) -> Option<Amounts> {
        Some(Amounts {
            gross: self.gross.checked_sub(rhs.gross)?,
            commission: self.commission.checked_sub(rhs.commission)?,
            fee: self.fee.checked_sub(rhs.fee)?,
            net: self.net.checked_sub(rhs.net)?,
        })
    }

    /// Largest absolute field value.
    pub fn max_abs(&self) -> Decimal {
        [self.gross, self.commission, self.fee, self.net]
            .into_iter()
            .map(|v| v.abs())
            .max()
            .unwrap_or_default()
    }
}

fn deduction(value: Decimal) -> Decimal {
    if value.is_zero() {
        Decimal::ZERO
    } else {
        -value.abs()
    }
}

/// Byte offsets `[start, end)` of a match in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start: usize,
    pub end: usize,
}

impl SourceSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Whether two spans share at least one byte.
    pub fn overlaps(&self, other: &SourceSpan) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// A single transaction row from the statement body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRow {
    /// Parsed monetary fields.
    #[serde(flatten)]
    pub amounts: Amounts,

    /// Location of the row, marker included.
    pub span: SourceSpan,

    /// The four numeric tokens as they appeared (or were split) in the text.
    pub raw: [String; 4],
}

impl TransactionRow {
    pub fn gross(&self) -> Decimal {
        self.amounts.gross
    }

    pub fn commission(&self) -> Decimal {
        self.amounts.commission
    }

    pub fn fee(&self) -> Decimal {
        self.amounts.fee
    }

    pub fn net(&self) -> Decimal {
        self.amounts.net
    }
}

/// The grand-total line printed by the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalsLine {
    /// Printed totals.
    #[serde(flatten)]
    pub amounts: Amounts,

    /// Location of the totals line, marker included.
    pub span: SourceSpan,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_deductions_normalized_negative() {
        let amounts = Amounts::new(d("100"), d("10"), d("-5"), d("85"));
        assert_eq!(amounts.commission, d("-10"));
        assert_eq!(amounts.fee, d("-5"));
        assert!(amounts.is_balanced(Decimal::ZERO));
    }

    #[test]
    fn test_residual() {
        let amounts = Amounts::new(d("100"), d("-10"), d("-5"), d("86"));
        assert_eq!(amounts.residual(), Some(d("-1")));
        assert!(!amounts.is_balanced(Decimal::new(1, 2)));
        assert!(amounts.is_balanced(Decimal::ONE));
    }

    #[test]
    fn test_sum_and_difference() {
        let a = Amounts::new(d("100"), d("-10"), d("-5"), d("85"));
        let b = Amounts::new(d("50.50"), d("-5"), d("-1"), d("44.50"));
        let total = a.checked_add(&b).unwrap();
        assert_eq!(total.gross, d("150.50"));
        assert_eq!(total.net, d("129.50"));

        let delta = total.checked_sub(&a).unwrap();
        assert_eq!(delta, b);
        assert_eq!(delta.max_abs(), d("50.50"));
        assert!(total.matches(&a.checked_add(&b).unwrap(), Decimal::ZERO));
    }

    #[test]
    fn test_arithmetic_out_of_range() {
        let huge = Amounts::new(Decimal::ZERO, -Decimal::MAX, -Decimal::MAX, Decimal::ZERO);
        assert_eq!(huge.residual(), None);
        assert!(!huge.is_balanced(Decimal::MAX));

        let big = Amounts::new(Decimal::MAX, Decimal::ZERO, Decimal::ZERO, Decimal::MAX);
        assert_eq!(big.residual(), Some(Decimal::ZERO));
        assert_eq!(big.checked_add(&big), None);
        let negative = Amounts {
            gross: -Decimal::MAX,
            ..Amounts::default()
        };
        assert_eq!(big.checked_sub(&negative), None);
        assert!(!big.matches(&negative, Decimal::MAX));
    }

    #[test]
    fn test_span_overlap() {
        let a = SourceSpan::new(0, 10);
        assert!(a.overlaps(&SourceSpan::new(9, 12)));
        assert!(!a.overlaps(&SourceSpan::new(10, 12)));
    }
}
