use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmotionalLanguage {
    High,
    Low,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceTrust {
    Trusted,
    Questionable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimVerification {
    Verified,
    Unverified,
}

/// Deterministic language-level credibility cues for the whole text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageSignals {
    pub emotional_language: EmotionalLanguage,
    pub source_trust: SourceTrust,
    pub claim_verification: ClaimVerification,
    /// 0–100; higher means more sensational and less verifiable.
    pub sensationalism_score: u8,
    /// Sensationalism above 50: the text reads like fabricated news.
    pub likely_fake: bool,
}
