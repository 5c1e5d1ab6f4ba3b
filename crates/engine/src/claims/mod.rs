pub mod heuristic;

use std::sync::Arc;

use veracity_common::config::ClaimsConfig;

use crate::interpret::{fields, recover_object};
use crate::llm::{ChatMessage, ReasoningEngine};

/// Claims from the engine must be longer than this after trimming.
const MIN_LLM_CLAIM_CHARS: usize = 10;
/// Claims at least this similar to an earlier one are dropped.
const NEAR_DUPLICATE_SIMILARITY: f64 = 0.9;

/// Which path produced the claims.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtractionMethod {
    ReasoningEngine,
    Heuristic,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReasoningEngine => "reasoning_engine",
            Self::Heuristic => "heuristic",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractionOutcome {
    pub claims: Vec<String>,
    pub method: ExtractionMethod,
}

/// Derives a bounded set of checkable statements from free text.
pub struct ClaimExtractor {
    engine: Option<Arc<dyn ReasoningEngine>>,
    prompt: String,
    max_claims: usize,
    min_llm_input_chars: usize,
    max_output_tokens: u32,
}

impl ClaimExtractor {
    pub fn new(
        engine: Option<Arc<dyn ReasoningEngine>>,
        prompt: impl Into<String>,
        config: &ClaimsConfig,
        max_output_tokens: u32,
    ) -> Self {
        Self {
            engine,
            prompt: prompt.into(),
            max_claims: config.max_claims as usize,
            min_llm_input_chars: config.min_llm_input_chars as usize,
            max_output_tokens,
        }
    }

    /// Extract claims. Never fails: any engine problem falls back to heuristics.
    pub async fn extract(&self, text: &str) -> ExtractionOutcome {
        let text = text.trim();
        if text.is_empty() {
            return ExtractionOutcome {
                claims: Vec::new(),
                method: ExtractionMethod::Heuristic,
            };
        }

        if text.chars().count() >= self.min_llm_input_chars {
            if let Some(claims) = self.extract_with_engine(text).await {
                return ExtractionOutcome {
                    claims,
                    method: ExtractionMethod::ReasoningEngine,
                };
            }
            metrics::counter!("pipeline.fallback", "stage" => "claims").increment(1);
        }

        let claims = heuristic::extract_claims(text, self.max_claims);
        tracing::info!(count = claims.len(), "Claims extracted heuristically");
        ExtractionOutcome {
            claims,
            method: ExtractionMethod::Heuristic,
        }
    }

    async fn extract_with_engine(&self, text: &str) -> Option<Vec<String>> {
        let engine = self.engine.as_ref()?;

        let messages = [
            ChatMessage::system(self.prompt.as_str()),
            ChatMessage::user(format!("Extract the factual claims from this text:\n\n{}", text)),
        ];

        let reply = match engine.chat(&messages, self.max_output_tokens).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(error = %e, "Claim extraction call failed, using heuristics");
                return None;
            }
        };

        let Some(recovered) = recover_object(&reply) else {
            tracing::warn!("Claim extraction reply had no JSON object, using heuristics");
            return None;
        };

        let claims = select_claims(
            fields::string_list(&recovered.value, &["claims"]),
            self.max_claims,
        );
        if claims.is_empty() {
            tracing::warn!("Claim extraction reply had no usable claims, using heuristics");
            return None;
        }

        tracing::info!(
            count = claims.len(),
            strategy = recovered.strategy.as_str(),
            "Claims extracted by reasoning engine"
        );
        Some(claims)
    }
}

/// Drop short entries and near-duplicates, then cap.
fn select_claims(raw: Vec<String>, max_claims: usize) -> Vec<String> {
    let mut kept: Vec<String> = Vec::new();
    for claim in raw {
        if kept.len() >= max_claims {
            break;
        }
        let claim = claim.trim();
        if claim.chars().count() <= MIN_LLM_CLAIM_CHARS {
            continue;
        }
        let lowered = claim.to_lowercase();
        let duplicate = kept.iter().any(|k| {
            strsim::normalized_levenshtein(&k.to_lowercase(), &lowered) >= NEAR_DUPLICATE_SIMILARITY
        });
        if !duplicate {
            kept.push(claim.to_string());
        }
    }
    kept
}
