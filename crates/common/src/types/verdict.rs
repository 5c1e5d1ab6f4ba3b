use std::fmt;

use serde::{Deserialize, Serialize};

use super::EvidenceItem;

/// Three-way judgment for a single claim.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerdictLabel {
    Supported,
    Refuted,
    Insufficient,
}

impl VerdictLabel {
    /// Map a free-form label to a verdict. Anything unrecognized is INSUFFICIENT.
    pub fn coerce(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "SUPPORTED" => Self::Supported,
            "REFUTED" => Self::Refuted,
            _ => Self::Insufficient,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Supported => "SUPPORTED",
            Self::Refuted => "REFUTED",
            Self::Insufficient => "INSUFFICIENT",
        }
    }
}

impl fmt::Display for VerdictLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Clamp an arbitrary numeric score into the 0–100 confidence range.
pub fn clamp_confidence(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}

/// Verdict for one claim, with the evidence it was judged against.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub claim: String,
    pub verdict: VerdictLabel,
    /// Always within 0–100.
    pub confidence: u8,
    pub explanation: String,
    #[serde(default)]
    pub top_evidence: Vec<EvidenceItem>,
}
