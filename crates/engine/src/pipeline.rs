use std::sync::Arc;

use tracing::Instrument;

use veracity_common::config::SystemConfig;
use veracity_common::types::{AnalysisResult, Claim, ProviderId, Verdict, VerdictLabel};
use veracity_evidence::EvidenceCascade;

use crate::authorship::AuthorshipEstimator;
use crate::claims::ClaimExtractor;
use crate::credibility::language_signals;
use crate::interpret::interpret_verdicts;
use crate::llm::{LlmError, ReasoningEngine};
use crate::prompts::Prompts;
use crate::verification::RequestBuilder;

/// The only failures an analyze request surfaces to its caller.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Input text is empty")]
    EmptyInput,

    #[error("Reasoning engine unavailable: {reason}")]
    ReasoningUnavailable { reason: String },

    #[error("Verdict response could not be parsed")]
    VerdictUnparseable { raw: String },
}

impl PipelineError {
    /// Stable machine-readable kind for API responses and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptyInput => "empty_input",
            Self::ReasoningUnavailable { .. } => "reasoning_unavailable",
            Self::VerdictUnparseable { .. } => "verdict_unparseable",
        }
    }
}

/// Sequences every stage of one analysis. Holds no per-request state.
pub struct Pipeline {
    engine: Option<Arc<dyn ReasoningEngine>>,
    cascade: EvidenceCascade,
    extractor: ClaimExtractor,
    builder: RequestBuilder,
    authorship: AuthorshipEstimator,
    top_evidence: usize,
}

impl Pipeline {
    pub fn new(
        engine: Option<Arc<dyn ReasoningEngine>>,
        cascade: EvidenceCascade,
        config: &SystemConfig,
        prompts: &Prompts,
    ) -> Self {
        let tokens = &config.llm.max_output_tokens;
        Self {
            extractor: ClaimExtractor::new(
                engine.clone(),
                prompts.claims.as_str(),
                &config.claims,
                tokens.claims,
            ),
            builder: RequestBuilder::new(
                prompts.verification.as_str(),
                &config.verification,
                tokens.verification,
            ),
            authorship: AuthorshipEstimator::new(
                engine.clone(),
                prompts.authorship.as_str(),
                config.authorship.ai_threshold,
                tokens.authorship,
            ),
            top_evidence: config.verification.top_evidence as usize,
            engine,
            cascade,
        }
    }

    /// Identity of the reasoning engine, if one is configured.
    pub fn engine_description(&self) -> Option<String> {
        self.engine.as_ref().map(|e| e.describe())
    }

    pub fn available_providers(&self) -> Vec<ProviderId> {
        self.cascade.available_providers()
    }

    /// Produce a full credibility assessment for `text`.
    pub async fn analyze(&self, text: &str) -> Result<AnalysisResult, PipelineError> {
        let request_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("analyze", %request_id);

        let result = self.run(text).instrument(span).await;

        let outcome = match &result {
            Ok(_) => "ok",
            Err(e) => e.kind(),
        };
        metrics::counter!("pipeline.requests", "outcome" => outcome).increment(1);
        result
    }

    async fn run(&self, text: &str) -> Result<AnalysisResult, PipelineError> {
        let start = std::time::Instant::now();
        let text = text.trim();
        if text.is_empty() {
            return Err(PipelineError::EmptyInput);
        }

        tracing::info!(chars = text.chars().count(), "Analysis started");

        let extraction = self.extractor.extract(text).await;
        tracing::info!(
            count = extraction.claims.len(),
            method = extraction.method.as_str(),
            "Claims extracted"
        );

        // Claims are retrieved strictly one after another.
        let mut claims = Vec::with_capacity(extraction.claims.len());
        for claim_text in extraction.claims {
            let evidence = self.cascade.retrieve(&claim_text).await;
            claims.push(Claim::new(claim_text).with_evidence(evidence));
        }

        let report = self.verify(text, &claims).await?;
        let authorship = self.authorship.estimate(text).await;
        let language_signals = language_signals(text);

        let overall_assessment = report
            .overall_assessment
            .unwrap_or_else(|| summarize(&report.verdicts));

        tracing::info!(
            verdicts = report.verdicts.len(),
            ai_confidence = authorship.ai_confidence,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Analysis complete"
        );

        Ok(AnalysisResult {
            claims: report.verdicts,
            overall_assessment,
            authorship,
            language_signals,
            analyzed_at: chrono::Utc::now(),
        })
    }

    async fn verify(
        &self,
        text: &str,
        claims: &[Claim],
    ) -> Result<crate::interpret::VerdictReport, PipelineError> {
        let engine = self
            .engine
            .as_ref()
            .ok_or_else(|| PipelineError::ReasoningUnavailable {
                reason: LlmError::Unconfigured.to_string(),
            })?;

        let request = self.builder.build(text, claims);
        let raw = engine
            .chat(&request.messages(), request.max_output_tokens)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Verification call failed");
                PipelineError::ReasoningUnavailable {
                    reason: e.to_string(),
                }
            })?;

        interpret_verdicts(&raw, claims, self.top_evidence).map_err(|e| {
            tracing::error!(error = %e, raw_len = raw.len(), "Verification reply unusable");
            PipelineError::VerdictUnparseable { raw }
        })
    }
}

/// Fallback overall assessment built from verdict counts.
fn summarize(verdicts: &[Verdict]) -> String {
    let count = |label: VerdictLabel| verdicts.iter().filter(|v| v.verdict == label).count();
    let supported = count(VerdictLabel::Supported);
    let refuted = count(VerdictLabel::Refuted);
    let insufficient = count(VerdictLabel::Insufficient);

    let lead = if verdicts.is_empty() {
        "No claims could be assessed."
    } else if refuted > 0 {
        "Some claims are contradicted by available evidence."
    } else if supported == verdicts.len() {
        "All checked claims are supported by available evidence."
    } else if insufficient == verdicts.len() {
        "Available evidence is insufficient to confirm or refute the claims."
    } else {
        "Claims are partly supported; the rest lack sufficient evidence."
    };

    format!(
        "{} {} supported, {} refuted, {} insufficient.",
        lead, supported, refuted, insufficient
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(label: VerdictLabel) -> Verdict {
        Verdict {
            claim: "c".into(),
            verdict: label,
            confidence: 50,
            explanation: String::new(),
            top_evidence: Vec::new(),
        }
    }

    #[test]
    fn test_summary_from_counts() {
        let mixed = vec![
            verdict(VerdictLabel::Supported),
            verdict(VerdictLabel::Refuted),
            verdict(VerdictLabel::Insufficient),
        ];
        assert_eq!(
            summarize(&mixed),
            "Some claims are contradicted by available evidence. 1 supported, 1 refuted, 1 insufficient."
        );
        assert!(summarize(&[verdict(VerdictLabel::Insufficient)]).starts_with("Available evidence is insufficient"));
        assert!(summarize(&[]).starts_with("No claims"));
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(PipelineError::EmptyInput.kind(), "empty_input");
        assert_eq!(
            PipelineError::ReasoningUnavailable {
                reason: "down".into()
            }
            .kind(),
            "reasoning_unavailable"
        );
        assert_eq!(
            PipelineError::VerdictUnparseable { raw: "oops".into() }.kind(),
            "verdict_unparseable"
        );
    }
}
