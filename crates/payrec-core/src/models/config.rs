//! Configuration structures for statement extraction.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::document::Fidelity;
use crate::error::PayrecError;

/// Main configuration for the payrec pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayrecConfig {
    /// Row and totals segmentation configuration.
    pub segment: SegmentConfig,

    /// Reconciliation configuration.
    pub reconcile: ReconcileConfig,
}

/// Row segmentation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentConfig {
    /// Currency code that starts every transaction row (matched case-insensitively).
    pub currency_marker: String,

    /// Literal text that starts the grand-total line.
    pub totals_marker: String,

    /// Fidelity to assume when the caller gives none (`None` = detect from text).
    pub default_fidelity: Option<Fidelity>,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            currency_marker: "JPY".to_string(),
            totals_marker: "合計".to_string(),
            default_fidelity: None,
        }
    }
}

/// Reconciliation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Largest difference at which two amounts still count as equal.
    pub epsilon: Decimal,

    /// Keep rows that fail `gross + commission + fee == net` in the sums.
    pub include_mismatched_rows: bool,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            epsilon: Decimal::new(1, 2),
            include_mismatched_rows: true,
        }
    }
}

impl PayrecConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Reject settings the parser cannot work with.
    pub fn validate(&self) -> crate::Result<()> {
        if self.segment.currency_marker.trim().is_empty() {
            return Err(PayrecError::Config("currency_marker must not be empty".to_string()));
        }
        if self.segment.totals_marker.trim().is_empty() {
            return Err(PayrecError::Config("totals_marker must not be empty".to_string()));
        }
        if self.reconcile.epsilon.is_sign_negative() {
            return Err(PayrecError::Config(format!(
                "epsilon must not be negative, got {}",
                self.reconcile.epsilon
            )));
        }
        Ok(())
    }
}
