use serde_json::{Map, Value};

use veracity_common::types::{clamp_confidence, Claim, Verdict, VerdictLabel};

use super::fields;
use super::recovery::recover_object;

/// Minimum normalized Levenshtein similarity for a fuzzy claim match.
const FUZZY_MATCH_THRESHOLD: f64 = 0.6;

const CLAIMS_KEYS: &[&str] = &["claims", "verdicts", "results"];
const CLAIM_TEXT_KEYS: &[&str] = &["claim", "text", "statement"];
const LABEL_KEYS: &[&str] = &["verdict", "label", "status", "rating"];
const CONFIDENCE_KEYS: &[&str] = &["confidence", "confidence_score", "confidenceScore", "score"];
const EXPLANATION_KEYS: &[&str] = &["explanation", "reasoning", "rationale", "justification"];
const OVERALL_KEYS: &[&str] = &[
    "overallAssessment",
    "overall_assessment",
    "overall",
    "summary",
];

/// Why a verification reply could not be turned into verdicts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseFailure {
    #[error("no JSON object found in reply")]
    NoObject,

    #[error("reply object has no claims array")]
    MissingClaims,
}

/// Verdicts recovered from one verification reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerdictReport {
    pub verdicts: Vec<Verdict>,
    pub overall_assessment: Option<String>,
}

/// Parse a verification reply and map it onto the claims that were sent.
///
/// Verdict count follows the reply; claims the engine skipped are not filled in.
pub fn interpret_verdicts(
    raw: &str,
    claims: &[Claim],
    top_evidence: usize,
) -> Result<VerdictReport, ParseFailure> {
    let recovered = recover_object(raw).ok_or(ParseFailure::NoObject)?;
    tracing::debug!(
        strategy = recovered.strategy.as_str(),
        "Recovered verification reply"
    );
    map_verdicts(&recovered.value, claims, top_evidence)
}

/// Map a recovered object into canonical verdicts.
pub fn map_verdicts(
    obj: &Map<String, Value>,
    claims: &[Claim],
    top_evidence: usize,
) -> Result<VerdictReport, ParseFailure> {
    let entries = fields::field(obj, CLAIMS_KEYS)
        .and_then(Value::as_array)
        .ok_or(ParseFailure::MissingClaims)?;

    let verdicts = entries
        .iter()
        .enumerate()
        .filter_map(|(position, entry)| {
            let entry = entry.as_object()?;
            map_entry(entry, position, claims, top_evidence)
        })
        .collect();

    Ok(VerdictReport {
        verdicts,
        overall_assessment: fields::text(obj, OVERALL_KEYS).map(str::to_string),
    })
}

fn map_entry(
    entry: &Map<String, Value>,
    position: usize,
    claims: &[Claim],
    top_evidence: usize,
) -> Option<Verdict> {
    let stated = fields::text(entry, CLAIM_TEXT_KEYS);
    let matched = match_claim(stated, position, claims);

    let claim_text = match (stated, matched) {
        (Some(text), _) => text.to_string(),
        (None, Some(claim)) => claim.text.clone(),
        (None, None) => return None,
    };

    let verdict = fields::text(entry, LABEL_KEYS)
        .map(VerdictLabel::coerce)
        .unwrap_or(VerdictLabel::Insufficient);

    let confidence = fields::field(entry, CONFIDENCE_KEYS)
        .and_then(fields::number)
        .map(clamp_confidence)
        .unwrap_or(0);

    let explanation = fields::text(entry, EXPLANATION_KEYS)
        .unwrap_or_default()
        .to_string();

    let top_evidence = matched
        .map(|claim| claim.evidence.iter().take(top_evidence).cloned().collect())
        .unwrap_or_default();

    Some(Verdict {
        claim: claim_text,
        verdict,
        confidence,
        explanation,
        top_evidence,
    })
}

/// Exact (case-insensitive) text, then closest fuzzy match, then position.
fn match_claim<'a>(stated: Option<&str>, position: usize, claims: &'a [Claim]) -> Option<&'a Claim> {
    if let Some(text) = stated {
        let lowered = text.to_lowercase();
        if let Some(claim) = claims.iter().find(|c| c.text.to_lowercase() == lowered) {
            return Some(claim);
        }

        let closest = claims
            .iter()
            .map(|c| (c, strsim::normalized_levenshtein(&c.text.to_lowercase(), &lowered)))
            .filter(|(_, score)| *score >= FUZZY_MATCH_THRESHOLD)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(c, _)| c);
        if closest.is_some() {
            return closest;
        }
    }

    claims.get(position)
}
