use serde::{Deserialize, Serialize};

/// Top-level system configuration, deserialized from system.toml.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SystemConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub retry: RetryConfig,
    #[serde(default)]
    pub evidence: EvidenceConfig,
    #[serde(default)]
    pub claims: ClaimsConfig,
    #[serde(default)]
    pub verification: VerificationConfig,
    #[serde(default)]
    pub authorship: AuthorshipConfig,
}

/// HTTP listener settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

/// Reasoning engine provider and model configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider name ("anthropic" or "openai").
    pub provider: String,
    /// Model identifier (e.g. "claude-sonnet-4-20250514", "gpt-4o-mini").
    pub model: String,
    /// Temperature (0.0–1.0).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Per-call HTTP timeout in seconds.
    #[serde(default = "default_llm_timeout")]
    pub request_timeout_seconds: u64,
    pub max_output_tokens: OutputTokenLimits,
}

fn default_llm_timeout() -> u64 {
    60
}

/// Output token budget per pipeline stage.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputTokenLimits {
    pub claims: u32,
    pub verification: u32,
    pub authorship: u32,
}

impl Default for OutputTokenLimits {
    fn default() -> Self {
        Self {
            claims: 500,
            verification: 2000,
            authorship: 600,
        }
    }
}

/// Retry configuration for reasoning engine calls.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub backoff_multiplier: f64,
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 500,
            max_backoff_ms: 8000,
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

/// Evidence retrieval limits.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EvidenceConfig {
    /// Max results requested from each provider.
    pub result_limit: u32,
    /// Result count at which the cascade stops trying further providers.
    pub sufficiency_threshold: u32,
    /// Queries shorter than this (after trim) are never sent anywhere.
    pub min_query_chars: u32,
    /// Timeout for web search provider calls.
    pub timeout_seconds: u64,
    /// Timeout for Wikipedia search and summary calls.
    pub wikipedia_timeout_seconds: u64,
    /// Max in-flight Wikipedia summary lookups per search.
    pub detail_fetch_concurrency: u32,
    /// Wikipedia language subdomain.
    pub wikipedia_language: String,
}

impl Default for EvidenceConfig {
    fn default() -> Self {
        Self {
            result_limit: 10,
            sufficiency_threshold: 3,
            min_query_chars: 5,
            timeout_seconds: 10,
            wikipedia_timeout_seconds: 8,
            detail_fetch_concurrency: 4,
            wikipedia_language: "en".into(),
        }
    }
}

/// Claim extraction limits.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaimsConfig {
    pub max_claims: u32,
    /// Inputs shorter than this skip the reasoning engine entirely.
    pub min_llm_input_chars: u32,
}

impl Default for ClaimsConfig {
    fn default() -> Self {
        Self {
            max_claims: 4,
            min_llm_input_chars: 40,
        }
    }
}

/// Verification request size bounds.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationConfig {
    /// Max chars of each evidence snippet embedded in the request.
    pub max_snippet_chars: u32,
    /// Max chars of the original text embedded in the request.
    pub max_text_chars: u32,
    /// Evidence items attached to each verdict.
    pub top_evidence: u32,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            max_snippet_chars: 400,
            max_text_chars: 4000,
            top_evidence: 3,
        }
    }
}

/// Authorship scoring thresholds.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorshipConfig {
    /// Confidence at or above which text is labelled machine-written.
    pub ai_threshold: u8,
}

impl Default for AuthorshipConfig {
    fn default() -> Self {
        Self { ai_threshold: 60 }
    }
}

/// Search provider credentials, read once at startup and handed to each adapter.
#[derive(Clone, Debug, Default)]
pub struct ProviderCredentials {
    pub serper_api_key: Option<String>,
    pub google_api_key: Option<String>,
    pub google_cse_id: Option<String>,
    pub brave_api_key: Option<String>,
    pub tavily_api_key: Option<String>,
    pub searxng_url: Option<String>,
}

impl ProviderCredentials {
    /// Read credentials from the process environment. Empty values count as unset.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build credentials from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            serper_api_key: get("SERPER_API_KEY"),
            google_api_key: get("GOOGLE_API_KEY"),
            google_cse_id: get("GOOGLE_CSE_ID"),
            brave_api_key: get("BRAVE_API_KEY"),
            tavily_api_key: get("TAVILY_API_KEY"),
            searxng_url: get("SEARXNG_URL"),
        }
    }
}
