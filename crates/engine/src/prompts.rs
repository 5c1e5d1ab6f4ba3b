//! System prompts for each reasoning-engine stage.
//!
//! Built-in defaults can be replaced by `config/prompts/{claims,verification,authorship}.md`.

use std::collections::HashMap;

pub const CLAIMS_PROMPT: &str = "\
You extract checkable factual claims from text.

Return at most 4 short, self-contained factual statements that could be verified \
against independent sources: events, figures, dates, quantities, attributions. \
Skip opinions, predictions and rhetorical questions. Rewrite each claim so it \
stands alone without pronouns that depend on the surrounding text.

Respond with a single JSON object and nothing else:
{\"claims\": [\"claim one\", \"claim two\"]}";

pub const VERIFICATION_PROMPT: &str = "\
You are a careful fact checker. For each claim you receive a list of evidence \
snippets gathered from search providers.

Judge each claim only against the supplied evidence and use exactly one label:
- SUPPORTED: the evidence corroborates the claim.
- REFUTED: the evidence contradicts the claim.
- INSUFFICIENT: the evidence is missing, off-topic or inconclusive.

A claim marked NO EVIDENCE FOUND had no results from any provider. Absence of \
evidence is informative: such claims are usually INSUFFICIENT unless the claim \
is common knowledge, and a specific, checkable claim with no coverage at all \
deserves lower confidence.

Give a confidence from 0 to 100 and a one or two sentence explanation citing \
the sources you relied on. Respond with a single JSON object and nothing else, \
in exactly this shape:
{\"claims\": [{\"claim\": \"...\", \"verdict\": \"SUPPORTED\", \"confidence\": 80, \
\"explanation\": \"...\"}], \"overallAssessment\": \"...\"}";

pub const AUTHORSHIP_PROMPT: &str = "\
You estimate whether a text was written by a person or generated by an AI model.

Score the likelihood that the text is AI-generated on this rubric:
- 0-20: confidently human
- 21-40: likely human
- 41-59: uncertain
- 60-79: likely AI
- 80-100: confidently AI

Indicators of AI writing: uniform sentence rhythm, stock transitions \
(\"Furthermore\", \"In conclusion\", \"It is important to note\"), balanced \
hedging on every point, generic examples, absence of contractions, no typos, \
summarising closing paragraphs.

Indicators of human writing: personal anecdotes and first-person detail, \
idiosyncratic phrasing or slang, typos and informal punctuation, uneven \
structure, strong opinions, specific local or temporal references.

Short texts carry little signal; prefer the uncertain band for them.

Respond with a single JSON object and nothing else:
{\"verdict\": \"AI\" | \"HUMAN\" | \"UNCERTAIN\", \"confidence\": 0-100, \
\"explanation\": \"...\", \"indicators\": [\"...\"]}";

/// Resolved system prompts for one pipeline.
#[derive(Clone, Debug)]
pub struct Prompts {
    pub claims: String,
    pub verification: String,
    pub authorship: String,
}

impl Default for Prompts {
    fn default() -> Self {
        Self {
            claims: CLAIMS_PROMPT.into(),
            verification: VERIFICATION_PROMPT.into(),
            authorship: AUTHORSHIP_PROMPT.into(),
        }
    }
}

impl Prompts {
    /// Built-in prompts with any non-blank loaded templates substituted.
    pub fn with_overrides(templates: &HashMap<String, String>) -> Self {
        let pick = |name: &str, default: &str| match templates.get(name) {
            Some(t) if !t.trim().is_empty() => {
                tracing::info!(prompt = name, "Using prompt override");
                t.trim().to_string()
            }
            _ => default.to_string(),
        };

        Self {
            claims: pick("claims", CLAIMS_PROMPT),
            verification: pick("verification", VERIFICATION_PROMPT),
            authorship: pick("authorship", AUTHORSHIP_PROMPT),
        }
    }
}
