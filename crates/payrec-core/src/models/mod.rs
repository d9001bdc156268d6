//! Data models for statement extraction.

pub mod config;
pub mod document;
pub mod report;
pub mod statement;

pub use config::{PayrecConfig, ReconcileConfig, SegmentConfig};
pub use document::{Fidelity, RawDocument};
pub use report::{Diagnostic, ReconciliationReport};
pub use statement::{Amounts, SourceSpan, TotalsLine, TransactionRow};
