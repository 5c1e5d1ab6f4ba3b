//! Deterministic language-level credibility cues.

use std::sync::LazyLock;

use regex::Regex;

use veracity_common::types::{
    ClaimVerification, EmotionalLanguage, LanguageSignals, SourceTrust,
};

const SENSATIONAL_PHRASES: &[&str] = &[
    "shocking",
    "unbelievable",
    "breaking",
    "must see",
    "you won't believe",
    "doctors hate",
    "secret",
    "they don't want you to know",
    "miracle",
    "amazing",
    "revealed",
    "exposed",
    "truth",
    "hoax",
    "conspiracy",
];

/// Sensationalism strictly above this marks the text as likely fake.
const LIKELY_FAKE_THRESHOLD: f64 = 50.0;

const TRUSTED_SCORE: f64 = 100.0;
const UNTRUSTED_SCORE: f64 = 30.0;

static TRUSTED_OUTLET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(bbc|reuters|ap news|associated press|npr|pbs|wall street journal|new york times|washington post|the guardian)\b",
    )
    .unwrap()
});

static CAPS_WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[A-Z]{3,}\b").unwrap());

static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d").unwrap());

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b\d{4}\b|\b(January|February|March|April|May|June|July|August|September|October|November|December)\b",
    )
    .unwrap()
});

/// Emotional-language score, 0 to 100.
pub fn emotional_score(text: &str) -> f64 {
    let words = text.split_whitespace().count();
    if words == 0 {
        return 0.0;
    }

    let lowered = text.to_lowercase().replace('\u{2019}', "'");
    let phrase_hits = SENSATIONAL_PHRASES
        .iter()
        .filter(|p| lowered.contains(*p))
        .count();
    let exclamations = text.matches('!').count();
    let caps_words = CAPS_WORD_RE.find_iter(text).count();

    let raw = (2 * phrase_hits + exclamations + caps_words) as f64;
    (raw / (words as f64 / 10.0) * 10.0).min(100.0)
}

/// 100 when a trusted outlet is named, otherwise 30.
pub fn trust_score(text: &str) -> f64 {
    if TRUSTED_OUTLET_RE.is_match(text) {
        TRUSTED_SCORE
    } else {
        UNTRUSTED_SCORE
    }
}

/// Presence of quotes, numbers and dates, 30 to 100.
pub fn verification_score(text: &str) -> f64 {
    let has_quotes = text.contains(&['"', '\u{201C}', '\u{201D}'][..]);
    let has_numbers = NUMBER_RE.is_match(text);
    let has_dates = DATE_RE.is_match(text);

    let score = 30
        + if has_quotes { 30 } else { 0 }
        + if has_numbers { 20 } else { 0 }
        + if has_dates { 20 } else { 0 };
    f64::from(score.min(100))
}

/// Combine the three component scores into labelled signals.
pub fn language_signals(text: &str) -> LanguageSignals {
    let emotional = emotional_score(text);
    let trust = trust_score(text);
    let verification = verification_score(text);

    let sensationalism =
        emotional * 0.4 + (100.0 - trust) * 0.4 + (100.0 - verification) * 0.2;

    LanguageSignals {
        emotional_language: if emotional > 50.0 {
            EmotionalLanguage::High
        } else {
            EmotionalLanguage::Low
        },
        source_trust: if trust > 60.0 {
            SourceTrust::Trusted
        } else {
            SourceTrust::Questionable
        },
        claim_verification: if verification > 60.0 {
            ClaimVerification::Verified
        } else {
            ClaimVerification::Unverified
        },
        sensationalism_score: sensationalism.round().clamp(0.0, 100.0) as u8,
        likely_fake: sensationalism > LIKELY_FAKE_THRESHOLD,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text() {
        assert_eq!(emotional_score(""), 0.0);
        let signals = language_signals("");
        assert_eq!(signals.emotional_language, EmotionalLanguage::Low);
        assert_eq!(signals.source_trust, SourceTrust::Questionable);
        assert_eq!(signals.claim_verification, ClaimVerification::Unverified);
        // 0.4 * 70 + 0.2 * 70
        assert_eq!(signals.sensationalism_score, 42);
        assert!(!signals.likely_fake);
    }

    #[test]
    fn test_sensational_text() {
        let text = "SHOCKING secret they don't want you to know! Doctors hate this miracle cure!";
        let signals = language_signals(text);
        assert_eq!(signals.emotional_language, EmotionalLanguage::High);
        assert_eq!(signals.source_trust, SourceTrust::Questionable);
        // 0.4 * 100 + 0.4 * 70 + 0.2 * 70
        assert_eq!(signals.sensationalism_score, 82);
        assert!(signals.likely_fake);
    }

    #[test]
    fn test_sober_sourced_report() {
        let text = "The central bank raised rates by 0.25 points in March 2024, \
                    Reuters reported, quoting the governor as saying \"inflation remains sticky\". \
                    Analysts had expected the move after several months of steady data releases \
                    and a tight labour market across most regions of the country.";
        let signals = language_signals(text);
        assert_eq!(signals.emotional_language, EmotionalLanguage::Low);
        assert_eq!(signals.source_trust, SourceTrust::Trusted);
        assert_eq!(signals.claim_verification, ClaimVerification::Verified);
        assert_eq!(signals.sensationalism_score, 0);
        assert!(!signals.likely_fake);
    }

    #[test]
    fn test_likely_fake_strictly_above_fifty() {
        // Untrusted, no emotion, numbers only: 0.4 * 70 + 0.2 * 50 = 38.
        assert!(!language_signals("Turnout was 61 percent this year").likely_fake);

        // Five phrase hits and one '!' in nine words cap emotional at 100: 40 + 28 + 14 = 82.
        let text = "Shocking secret miracle hoax exposed, nobody saw it coming!";
        assert!(language_signals(text).likely_fake);
    }

    #[test]
    fn test_trusted_outlets_match_whole_words() {
        assert_eq!(trust_score("According to the BBC, the vote passed."), 100.0);
        assert_eq!(trust_score("As the Washington Post noted"), 100.0);
        assert_eq!(trust_score("Snapple drinkers rejoice"), 30.0);
        assert_eq!(trust_score("Unpbsx"), 30.0);
    }

    #[test]
    fn test_verification_components() {
        assert_eq!(verification_score("plain words"), 30.0);
        assert_eq!(verification_score("7 apples"), 50.0);
        assert_eq!(verification_score("In 1999 it happened"), 70.0);
        assert_eq!(verification_score("He said \u{201C}yes\u{201D} in 1999"), 100.0);
    }
}
