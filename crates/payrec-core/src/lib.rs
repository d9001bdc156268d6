//! Core library for payout statement extraction.
//!
//! This crate provides:
//! - Row segmentation for whitespace-preserving and whitespace-collapsed
//!   PDF-to-text output
//! - Grand-total line extraction
//! - Reconciliation of summed rows against the printed totals
//!
//! The input is text an upstream extraction backend already produced; this
//! crate never reads PDFs itself.

pub mod error;
pub mod models;
pub mod statement;

pub use error::{ExtractionError, PayrecError, Result, ValidationError};
pub use models::{
    Amounts, Diagnostic, Fidelity, PayrecConfig, RawDocument, ReconciliationReport, TotalsLine,
    TransactionRow,
};
pub use statement::{
    reconcile, ExtractionResult, PayoutStatementParser, RowSegmenter, StatementParser,
    TotalsExtractor,
};
