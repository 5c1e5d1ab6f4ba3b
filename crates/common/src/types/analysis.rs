use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AuthorshipSignal, LanguageSignals, Verdict, VerdictLabel};

/// The assessment returned for one analyze request. Rebuilt from scratch per request.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub claims: Vec<Verdict>,
    pub overall_assessment: String,
    pub authorship: AuthorshipSignal,
    pub language_signals: LanguageSignals,
    pub analyzed_at: DateTime<Utc>,
}

impl AnalysisResult {
    /// Number of verdicts carrying the given label.
    pub fn count(&self, label: VerdictLabel) -> usize {
        self.claims.iter().filter(|v| v.verdict == label).count()
    }
}
