//! Lexical authorship scorer used when the reasoning engine is unavailable.

use std::collections::BTreeSet;

use crate::claims::heuristic::split_sentences;

/// Texts shorter than this carry too little signal to score.
const MIN_WORDS: usize = 20;
/// Score returned for texts below `MIN_WORDS`.
const SHORT_TEXT_SCORE: i32 = 10;
const SEED_SCORE: i32 = 50;

const STRONG_CLICHES: &[&str] = &[
    "as an ai language model",
    "it is important to note",
    "it's important to note",
    "it is worth noting",
    "in today's fast-paced world",
    "delve into",
    "a testament to",
    "rich tapestry",
    "navigate the complexities",
    "in the ever-evolving",
    "in conclusion",
];
const STRONG_CLICHE_WEIGHT: i32 = 12;

const MODERATE_CLICHES: &[&str] = &[
    "furthermore",
    "moreover",
    "additionally",
    "in summary",
    "plays a crucial role",
    "a wide range of",
    "seamlessly",
    "leverage",
    "ultimately",
    "on the other hand",
    "overall,",
];
const MODERATE_CLICHE_WEIGHT: i32 = 8;

/// Contraction sparsity only counts for texts at least this long.
const CONTRACTION_MIN_WORDS: usize = 80;
const NO_CONTRACTIONS_WEIGHT: i32 = 18;
const SPARSE_CONTRACTIONS_WEIGHT: i32 = 10;
const SPARSE_CONTRACTION_RATE: f64 = 0.01;

const MISSPELLINGS: &[&str] = &[
    "teh", "recieve", "definately", "seperate", "occured", "untill", "wich", "becuase", "alot",
    "thier", "goverment", "accomodate", "beleive", "wierd", "tommorow", "existance", "arguement",
    "noticable", "publically", "truely", "dont", "cant", "im",
];
const MISSPELLING_WEIGHT: i32 = 10;
const MISSPELLING_CAP: i32 = 30;

const OPENER_MIN_SENTENCES: usize = 6;
const OPENER_DISTINCT_RATIO: f64 = 0.5;
const REPETITIVE_OPENER_WEIGHT: i32 = 22;

const FIRST_PERSON: &[&str] = &["i", "me", "my", "mine", "myself", "i'm", "i've", "i'd", "i'll"];
const FIRST_PERSON_MIN: usize = 3;
const FIRST_PERSON_RATE: f64 = 0.03;
const FIRST_PERSON_WEIGHT: i32 = 15;

const EXPRESSIVE_PUNCT_RATE: f64 = 0.3;
const EXPRESSIVE_PUNCT_WEIGHT: i32 = 10;

/// Heuristic authorship estimate before thresholding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeuristicScore {
    pub confidence: u8,
    pub explanation: String,
    pub indicators: BTreeSet<String>,
}

/// Score how likely `text` is machine-generated, 0 to 100. Total.
pub fn score(text: &str) -> HeuristicScore {
    let tokens: Vec<String> = text.split_whitespace().map(normalize_token).collect();
    let word_count = tokens.iter().filter(|t| !t.is_empty()).count();

    if word_count < MIN_WORDS {
        return HeuristicScore {
            confidence: SHORT_TEXT_SCORE as u8,
            explanation: format!(
                "Only {} words; too little text to judge authorship.",
                word_count
            ),
            indicators: BTreeSet::from(["insufficient text".to_string()]),
        };
    }

    let lowered = text.to_lowercase();
    let mut score = SEED_SCORE;
    let mut indicators = BTreeSet::new();
    let mut human_cues = 0;
    let mut ai_cues = 0;

    for phrase in STRONG_CLICHES {
        if lowered.contains(phrase) {
            score += STRONG_CLICHE_WEIGHT;
            ai_cues += 1;
            indicators.insert(format!("stock phrase: \"{}\"", phrase));
        }
    }
    for phrase in MODERATE_CLICHES {
        if lowered.contains(phrase) {
            score += MODERATE_CLICHE_WEIGHT;
            ai_cues += 1;
            indicators.insert(format!("formal transition: \"{}\"", phrase.trim_end_matches(',')));
        }
    }

    if word_count >= CONTRACTION_MIN_WORDS {
        let contractions = tokens.iter().filter(|t| is_contraction(t)).count();
        if contractions == 0 {
            score += NO_CONTRACTIONS_WEIGHT;
            ai_cues += 1;
            indicators.insert("no contractions".to_string());
        } else if (contractions as f64 / word_count as f64) < SPARSE_CONTRACTION_RATE {
            score += SPARSE_CONTRACTIONS_WEIGHT;
            ai_cues += 1;
            indicators.insert("few contractions".to_string());
        }
    }

    let misspelled: BTreeSet<&str> = tokens
        .iter()
        .filter_map(|t| MISSPELLINGS.iter().find(|m| **m == t.as_str()).copied())
        .collect();
    if !misspelled.is_empty() {
        score -= (misspelled.len() as i32 * MISSPELLING_WEIGHT).min(MISSPELLING_CAP);
        human_cues += 1;
        indicators.insert(format!("misspellings ({})", misspelled.len()));
    }

    let sentences = split_sentences(text);
    if sentences.len() >= OPENER_MIN_SENTENCES {
        let openers: Vec<String> = sentences
            .iter()
            .filter_map(|s| s.split_whitespace().next())
            .map(normalize_token)
            .collect();
        let distinct: BTreeSet<&String> = openers.iter().collect();
        if (distinct.len() as f64 / openers.len().max(1) as f64) < OPENER_DISTINCT_RATIO {
            score += REPETITIVE_OPENER_WEIGHT;
            ai_cues += 1;
            indicators.insert("repetitive sentence openers".to_string());
        }
    }

    let first_person = tokens
        .iter()
        .filter(|t| FIRST_PERSON.contains(&t.as_str()))
        .count();
    if first_person >= FIRST_PERSON_MIN
        && (first_person as f64 / word_count as f64) > FIRST_PERSON_RATE
    {
        score -= FIRST_PERSON_WEIGHT;
        human_cues += 1;
        indicators.insert("personal first-person voice".to_string());
    }

    let expressive = text.chars().filter(|c| matches!(c, '!' | '?')).count();
    if (expressive as f64 / sentences.len().max(1) as f64) > EXPRESSIVE_PUNCT_RATE {
        score -= EXPRESSIVE_PUNCT_WEIGHT;
        human_cues += 1;
        indicators.insert("expressive punctuation".to_string());
    }

    let confidence = score.clamp(0, 100) as u8;
    let explanation = format!(
        "Lexical analysis found {} machine-typical and {} human-typical cues across {} words.",
        ai_cues, human_cues, word_count
    );

    HeuristicScore {
        confidence,
        explanation,
        indicators,
    }
}

/// Lowercase with surrounding punctuation removed; inner apostrophes kept.
fn normalize_token(token: &str) -> String {
    token
        .trim_matches(|c: char| !c.is_alphanumeric())
        .replace('\u{2019}', "'")
        .to_lowercase()
}

fn is_contraction(token: &str) -> bool {
    let chars: Vec<char> = token.chars().collect();
    chars.windows(3).any(|w| w[0].is_alphabetic() && w[1] == '\'' && w[2].is_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_short_text() {
        assert_eq!(score("").confidence, 10);
        assert_eq!(score("Just a handful of words here.").confidence, 10);
        assert!(score("").indicators.contains("insufficient text"));
    }

    #[test]
    fn test_neutral_text_stays_near_seed() {
        let text = "The council met on Tuesday to discuss the new bus routes. \
                    Residents asked for later evening service on weekdays. \
                    A final decision is expected next month after a public survey.";
        let result = score(text);
        assert_eq!(result.confidence, 50);
        assert!(result.indicators.is_empty());
    }

    #[test]
    fn test_cliche_heavy_text_scores_high() {
        let text = "In today's fast-paced world, it is important to note that technology \
                    plays a crucial role in society. Furthermore, organizations must navigate the \
                    complexities of change. Moreover, we must delve into a wide range of \
                    considerations. In conclusion, innovation is a testament to human progress.";
        let result = score(text);
        assert_eq!(result.confidence, 100);
        assert!(result.indicators.contains("stock phrase: \"delve into\""));
        assert!(result.indicators.contains("formal transition: \"furthermore\""));
    }

    #[test]
    fn test_casual_text_scores_low() {
        let text = "ok so i went to the game last nite and honestly teh crowd was insane!! \
                    i cant believe we won?! my brother said it was the best game he's seen. \
                    i'm still buzzing lol, definately going again next week!";
        let result = score(text);
        assert!(result.confidence < 60, "got {}", result.confidence);
        assert!(result.indicators.contains("personal first-person voice"));
        assert!(result.indicators.contains("expressive punctuation"));
    }

    #[test]
    fn test_misspelling_penalty_capped() {
        let base = "word ".repeat(30);
        let text = format!("{} teh recieve definately seperate occured untill", base);
        let result = score(&text);
        assert!(result.indicators.contains("misspellings (6)"));
        // Seed 50, minus capped 30, plus none else.
        assert_eq!(result.confidence, 20);
    }

    #[test]
    fn test_missing_contractions_in_long_text() {
        let sentence = "The system processes every request in a consistent and efficient manner";
        let text = std::iter::repeat(sentence).take(8).collect::<Vec<_>>().join(", and ");
        let result = score(&text);
        assert!(result.indicators.contains("no contractions"));
        assert_eq!(result.confidence, 68);
    }

    #[test]
    fn test_repetitive_openers() {
        let text = (0..6)
            .map(|i| format!("The report covers topic number {} in some detail.", i))
            .collect::<Vec<_>>()
            .join(" ");
        let result = score(&text);
        assert!(result.indicators.contains("repetitive sentence openers"));
        assert_eq!(result.confidence, 72);
    }

    #[test]
    fn test_contraction_detection() {
        assert!(is_contraction("don't"));
        assert!(is_contraction(&normalize_token("We\u{2019}re")));
        assert!(!is_contraction("'quoted'"));
        assert!(!is_contraction("plain"));
    }

    #[test]
    fn test_score_always_in_range() {
        let extreme = "As an AI language model, it is important to note. ".repeat(40);
        assert!(score(&extreme).confidence <= 100);
        let human = "i teh recieve wierd thier alot!!! ".repeat(20);
        assert!(score(&human).confidence <= 100);
    }
}
