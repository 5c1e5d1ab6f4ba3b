use serde::{Deserialize, Serialize};

/// POST /api/analyze request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
}

/// Error body returned when an analysis cannot be completed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Machine-readable failure class ("empty_input", "reasoning_unavailable", "verdict_unparseable").
    pub kind: String,
    /// Raw reasoning engine output, for diagnosing parse failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

/// GET /health response.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    /// Whether a reasoning engine client is configured.
    pub reasoning_engine: bool,
    /// Providers whose availability predicate currently holds, in cascade order.
    pub providers: Vec<String>,
}
