use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Which path produced an authorship signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthorshipMethod {
    ReasoningEngine,
    HeuristicFallback,
}

/// Human vs. machine-generated assessment of the whole input text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorshipSignal {
    #[serde(rename = "isAIWritten")]
    pub is_ai_written: bool,
    #[serde(rename = "aiConfidence")]
    pub ai_confidence: u8,
    #[serde(rename = "aiExplanation")]
    pub ai_explanation: String,
    #[serde(rename = "keyIndicators")]
    pub key_indicators: BTreeSet<String>,
    pub method: AuthorshipMethod,
}

impl AuthorshipSignal {
    /// Build a signal whose label is derived strictly from the confidence score.
    pub fn from_score(
        ai_confidence: u8,
        threshold: u8,
        ai_explanation: String,
        key_indicators: BTreeSet<String>,
        method: AuthorshipMethod,
    ) -> Self {
        let ai_confidence = ai_confidence.min(100);
        Self {
            is_ai_written: ai_confidence >= threshold,
            ai_confidence,
            ai_explanation,
            key_indicators,
            method,
        }
    }
}
