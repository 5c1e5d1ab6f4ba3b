//! Assembly of the single verification request sent to the reasoning engine.

use std::fmt::Write as _;

use veracity_common::config::VerificationConfig;
use veracity_common::types::Claim;
use veracity_evidence::normalize::truncate_chars;

use crate::llm::ChatMessage;

/// Placed under a claim that has no evidence at all.
pub const NO_EVIDENCE_MARKER: &str = "NO EVIDENCE FOUND";

/// A ready-to-send verification request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationRequest {
    pub system: String,
    pub user: String,
    pub max_output_tokens: u32,
}

impl VerificationRequest {
    pub fn messages(&self) -> [ChatMessage; 2] {
        [
            ChatMessage::system(self.system.as_str()),
            ChatMessage::user(self.user.as_str()),
        ]
    }
}

/// Builds verification requests. Pure: the same input yields the same request.
#[derive(Clone, Debug)]
pub struct RequestBuilder {
    system_prompt: String,
    max_snippet_chars: usize,
    max_text_chars: usize,
    max_output_tokens: u32,
}

impl RequestBuilder {
    pub fn new(
        system_prompt: impl Into<String>,
        config: &VerificationConfig,
        max_output_tokens: u32,
    ) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            max_snippet_chars: config.max_snippet_chars as usize,
            max_text_chars: config.max_text_chars as usize,
            max_output_tokens,
        }
    }

    /// Pair every claim with its evidence, in claim order.
    pub fn build(&self, text: &str, claims: &[Claim]) -> VerificationRequest {
        let mut user = String::new();

        let _ = writeln!(user, "ORIGINAL TEXT:");
        let _ = writeln!(user, "\"\"\"");
        let _ = writeln!(user, "{}", truncate_chars(text.trim(), self.max_text_chars));
        let _ = writeln!(user, "\"\"\"");
        let _ = writeln!(user);
        let _ = writeln!(user, "CLAIMS AND EVIDENCE:");

        for (i, claim) in claims.iter().enumerate() {
            let _ = writeln!(user);
            let _ = writeln!(user, "Claim {}: {}", i + 1, claim.text);

            if !claim.has_evidence() {
                let _ = writeln!(user, "Evidence: {}", NO_EVIDENCE_MARKER);
                let _ = writeln!(
                    user,
                    "(No provider returned results for this claim. Treat the absence of evidence as informative.)"
                );
                continue;
            }

            let _ = writeln!(user, "Evidence:");
            for (j, item) in claim.evidence.iter().enumerate() {
                let _ = writeln!(user, "  [{}] {} ({})", j + 1, item.title, item.source);
                if !item.url.is_empty() {
                    let _ = writeln!(user, "      URL: {}", item.url);
                }
                if !item.snippet.is_empty() {
                    let _ = writeln!(
                        user,
                        "      {}",
                        truncate_chars(&item.snippet, self.max_snippet_chars)
                    );
                }
            }
        }

        let _ = writeln!(user);
        let _ = write!(
            user,
            "Return one entry per claim above, labelled SUPPORTED, REFUTED or INSUFFICIENT, \
             as a single JSON object in the declared shape. Do not write anything outside the JSON."
        );

        VerificationRequest {
            system: self.system_prompt.clone(),
            user,
            max_output_tokens: self.max_output_tokens,
        }
    }
}
