//! Raw extracted text and its whitespace fidelity.

use serde::{Deserialize, Serialize};

use crate::statement::rules::patterns::CONCATENATED_SIGNATURE;

/// Whether the extraction backend preserved whitespace between fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fidelity {
    /// Fields are separated by spaces or newlines.
    Delimited,
    /// Each row is emitted as one unbroken run of digits and anchors.
    Concatenated,
}

impl Fidelity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delimited => "delimited",
            Self::Concatenated => "concatenated",
        }
    }
}

impl std::fmt::Display for Fidelity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text produced by an upstream PDF-to-text backend, tagged with its fidelity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    text: String,
    fidelity: Fidelity,
}

impl RawDocument {
    /// Wrap extracted text with a known fidelity.
    pub fn new(text: impl Into<String>, fidelity: Fidelity) -> Self {
        Self {
            text: text.into(),
            fidelity,
        }
    }

    /// Wrap extracted text, inferring fidelity from its content.
    ///
    /// A `NN.NN-NN-N` run (decimal amount fused with two deductions) only
    /// shows up when the backend dropped the separating whitespace.
    pub fn detect(text: impl Into<String>) -> Self {
        let text = text.into();
        let fidelity = if CONCATENATED_SIGNATURE.is_match(&text) {
            Fidelity::Concatenated
        } else {
            Fidelity::Delimited
        };
        Self { text, fidelity }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn fidelity(&self) -> Fidelity {
        self.fidelity
    }

    /// Whether the document has no non-whitespace content.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}
