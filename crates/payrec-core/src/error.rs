//! Error types for the payrec-core library.

use thiserror::Error;

use crate::models::Amounts;

/// Main error type for the payrec library.
#[derive(Error, Debug)]
pub enum PayrecError {
    /// Statement extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Extracted rows failed validation against the document.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to statement extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The document contains no text at all.
    #[error("no statement data found")]
    NoData,

    /// A marker pattern could not be compiled.
    #[error("invalid marker pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// A configured marker is empty and would match everywhere.
    #[error("empty {0} marker")]
    EmptyMarker(&'static str),

    /// Amounts too large to sum exactly.
    #[error("amount overflow in {0}")]
    Overflow(&'static str),
}

/// Failed validation of an otherwise successful extraction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// The printed totals line disagrees with the summed rows.
    #[error(
        "totals line mismatch (summed - printed): gross {}, commission {}, fee {}, net {}",
        .delta.gross, .delta.commission, .delta.fee, .delta.net
    )]
    TotalsLineMismatch { delta: Amounts },
}

/// Result type for the payrec library.
pub type Result<T> = std::result::Result<T, PayrecError>;
