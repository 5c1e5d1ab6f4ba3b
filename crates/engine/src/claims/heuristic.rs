//! Deterministic claim selection used when the reasoning engine is unavailable.

use std::sync::LazyLock;

use regex::Regex;

/// Shortest sentence considered a claim candidate.
pub const MIN_SENTENCE_CHARS: usize = 15;
/// Sentences kept when nothing looks factual.
const LONGEST_FALLBACK: usize = 3;
/// Length of the raw-text claim used as a last resort.
const RAW_CLAIM_CHARS: usize = 300;

static MONTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(January|February|March|April|May|June|July|August|September|October|November|December)\b",
    )
    .unwrap()
});

static AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)([$€£¥]\s?\d)|(\d(\.\d+)?\s?(%|percent\b|per cent\b))|(\d\s?(thousand|million|billion|trillion)\b)",
    )
    .unwrap()
});

static NAME_BIGRAM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z][a-z]+\s+[A-Z][a-z]+\b").unwrap());

static ORG_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(Inc|Corp|Corporation|Ltd|LLC|PLC|plc|GmbH|Co|AG|SA|Group|Holdings)\b").unwrap()
});

static REPORTING_VERB_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(said|says|stated|announced|reported|confirmed|revealed|claimed|according to|told)\b",
    )
    .unwrap()
});

/// Split on `.`, `!` or `?` followed by whitespace or the end of the text.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let at_boundary = match chars.peek() {
            None => true,
            Some((_, next)) => next.is_whitespace(),
        };
        if at_boundary {
            let end = i + c.len_utf8();
            push_trimmed(&mut sentences, &text[start..end]);
            start = end;
        }
    }
    push_trimmed(&mut sentences, &text[start..]);

    sentences
}

fn push_trimmed<'a>(out: &mut Vec<&'a str>, s: &'a str) {
    let s = s.trim();
    if !s.is_empty() {
        out.push(s);
    }
}

/// How strongly a sentence looks like a checkable statement of fact.
pub fn facty_score(sentence: &str) -> u32 {
    let mut score = 0;
    if sentence.chars().any(|c| c.is_ascii_digit()) {
        score += 2;
    }
    if MONTH_RE.is_match(sentence) {
        score += 2;
    }
    if AMOUNT_RE.is_match(sentence) {
        score += 2;
    }
    if NAME_BIGRAM_RE.is_match(sentence) {
        score += 1;
    }
    if ORG_SUFFIX_RE.is_match(sentence) {
        score += 2;
    }
    if REPORTING_VERB_RE.is_match(sentence) {
        score += 1;
    }
    score
}

/// Pick up to `max_claims` sentences from `text`, in document order.
///
/// Non-empty input always yields at least one claim.
pub fn extract_claims(text: &str, max_claims: usize) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() || max_claims == 0 {
        return Vec::new();
    }

    let candidates: Vec<(usize, &str)> = split_sentences(trimmed)
        .into_iter()
        .filter(|s| s.chars().count() >= MIN_SENTENCE_CHARS)
        .enumerate()
        .collect();

    let mut scored: Vec<(usize, &str, u32)> = candidates
        .iter()
        .map(|&(i, s)| (i, s, facty_score(s)))
        .filter(|&(_, _, score)| score > 0)
        .collect();

    let mut picked: Vec<(usize, &str)> = if !scored.is_empty() {
        // Stable sort keeps earlier sentences ahead on equal scores.
        scored.sort_by(|a, b| b.2.cmp(&a.2));
        scored
            .into_iter()
            .take(max_claims)
            .map(|(i, s, _)| (i, s))
            .collect()
    } else {
        let mut by_length = candidates.clone();
        by_length.sort_by(|a, b| b.1.chars().count().cmp(&a.1.chars().count()));
        by_length
            .into_iter()
            .take(LONGEST_FALLBACK.min(max_claims))
            .collect()
    };

    if picked.is_empty() {
        return vec![trimmed.chars().take(RAW_CLAIM_CHARS).collect()];
    }

    picked.sort_by_key(|&(i, _)| i);
    picked.into_iter().map(|(_, s)| s.to_string()).collect()
}
