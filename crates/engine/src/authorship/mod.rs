pub mod heuristic;

use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::{Map, Value};

use veracity_common::types::{clamp_confidence, AuthorshipMethod, AuthorshipSignal};

use crate::interpret::{fields, recover_object};
use crate::llm::{ChatMessage, ReasoningEngine};

/// Text sent to the engine is cut to this many chars.
const MAX_PROMPT_TEXT_CHARS: usize = 6000;

/// Estimates whether the input text is machine-generated.
pub struct AuthorshipEstimator {
    engine: Option<Arc<dyn ReasoningEngine>>,
    prompt: String,
    threshold: u8,
    max_output_tokens: u32,
}

impl AuthorshipEstimator {
    pub fn new(
        engine: Option<Arc<dyn ReasoningEngine>>,
        prompt: impl Into<String>,
        threshold: u8,
        max_output_tokens: u32,
    ) -> Self {
        Self {
            engine,
            prompt: prompt.into(),
            threshold,
            max_output_tokens,
        }
    }

    /// Never fails: any engine problem falls back to the lexical scorer.
    pub async fn estimate(&self, text: &str) -> AuthorshipSignal {
        if let Some(signal) = self.estimate_with_engine(text).await {
            return signal;
        }

        metrics::counter!("pipeline.fallback", "stage" => "authorship").increment(1);
        let scored = heuristic::score(text);
        tracing::info!(
            confidence = scored.confidence,
            "Authorship estimated heuristically"
        );
        AuthorshipSignal::from_score(
            scored.confidence,
            self.threshold,
            scored.explanation,
            scored.indicators,
            AuthorshipMethod::HeuristicFallback,
        )
    }

    async fn estimate_with_engine(&self, text: &str) -> Option<AuthorshipSignal> {
        let engine = self.engine.as_ref()?;

        let excerpt: String = text.trim().chars().take(MAX_PROMPT_TEXT_CHARS).collect();
        let messages = [
            ChatMessage::system(self.prompt.as_str()),
            ChatMessage::user(format!("Assess the authorship of this text:\n\n\"\"\"\n{}\n\"\"\"", excerpt)),
        ];

        let reply = match engine.chat(&messages, self.max_output_tokens).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(error = %e, "Authorship call failed, using heuristics");
                return None;
            }
        };

        let Some(recovered) = recover_object(&reply) else {
            tracing::warn!("Authorship reply had no JSON object, using heuristics");
            return None;
        };

        let signal = signal_from_reply(&recovered.value, self.threshold);
        if signal.is_none() {
            tracing::warn!("Authorship reply had neither verdict nor confidence, using heuristics");
        }
        signal
    }
}

/// Engine-reported label.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AuthorshipLabel {
    Ai,
    Human,
    Uncertain,
}

impl AuthorshipLabel {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "AI" | "AI-GENERATED" | "AI_GENERATED" | "MACHINE" => Some(Self::Ai),
            "HUMAN" | "HUMAN-WRITTEN" | "HUMAN_WRITTEN" => Some(Self::Human),
            "UNCERTAIN" | "MIXED" | "UNKNOWN" => Some(Self::Uncertain),
            _ => None,
        }
    }

    /// Confidence implied by the label when the engine gives none.
    fn default_confidence(&self) -> u8 {
        match self {
            Self::Ai => 75,
            Self::Uncertain => 50,
            Self::Human => 25,
        }
    }
}

fn signal_from_reply(obj: &Map<String, Value>, threshold: u8) -> Option<AuthorshipSignal> {
    let label = fields::text(obj, &["verdict", "label", "classification"]).and_then(AuthorshipLabel::parse);
    let stated = fields::field(obj, &["confidence", "aiConfidence", "ai_confidence", "score"])
        .and_then(fields::number)
        .map(clamp_confidence);

    let confidence = stated.or_else(|| label.map(|l| l.default_confidence()))?;

    let explanation = fields::text(obj, &["explanation", "reasoning", "aiExplanation"])
        .map(str::to_string)
        .unwrap_or_else(|| "No explanation given.".to_string());

    let indicators: BTreeSet<String> =
        fields::string_list(obj, &["indicators", "keyIndicators", "key_indicators"])
            .into_iter()
            .collect();

    Some(AuthorshipSignal::from_score(
        confidence,
        threshold,
        explanation,
        indicators,
        AuthorshipMethod::ReasoningEngine,
    ))
}
