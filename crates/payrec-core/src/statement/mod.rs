//! Payout statement extraction: row segmentation, totals line, reconciliation.

mod parser;
pub mod reconcile;
pub mod rules;
pub mod segmenter;
pub mod totals;

pub use parser::{ExtractionResult, PayoutStatementParser, StatementParser};
pub use reconcile::reconcile;
pub use segmenter::{RowSegmenter, Rows, Segmentation, UnparseableRow};
pub use totals::TotalsExtractor;

use crate::error::ExtractionError;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;
