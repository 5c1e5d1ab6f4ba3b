mod anthropic;
mod openai;
pub mod types;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use veracity_common::config::{LlmConfig, RetryConfig};

pub use types::{ChatMessage, ChatRole, LlmReply, StopReason, TokenUsage};

/// Boxed future returned by [`ReasoningEngine::chat`].
pub type ChatFuture<'a> = Pin<Box<dyn Future<Output = Result<String, LlmError>> + Send + 'a>>;

/// Object-safe trait for testability (dyn dispatch).
/// Tests provide scripted engines; production uses LlmClient.
pub trait ReasoningEngine: Send + Sync {
    fn chat<'a>(&'a self, messages: &'a [ChatMessage], max_output_tokens: u32) -> ChatFuture<'a>;

    /// Short human-readable identity for health reporting.
    fn describe(&self) -> String {
        "reasoning-engine".into()
    }
}

/// LLM API client with provider dispatch and retry logic.
pub struct LlmClient {
    http: reqwest::Client,
    config: LlmConfig,
    retry_config: RetryConfig,
    api_key: String,
}

/// Errors from LLM API calls.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("LLM HTTP error: {0}")]
    Http(String),

    #[error("LLM auth error: {0}")]
    Auth(String),

    #[error("LLM rate limited (retry after {retry_after:?}s)")]
    RateLimited { retry_after: Option<u64> },

    #[error("LLM context window exceeded: {0}")]
    ContextWindowExceeded(String),

    #[error("LLM API error: {0}")]
    Api(String),

    #[error("LLM response parse error: {0}")]
    Parse(String),

    #[error("No reasoning engine configured")]
    Unconfigured,
}

impl LlmError {
    /// Whether this error should not be retried.
    fn is_non_retryable(&self) -> bool {
        matches!(
            self,
            LlmError::Auth(_) | LlmError::ContextWindowExceeded(_) | LlmError::Unconfigured
        )
    }
}

/// Environment variable holding the API key for a provider.
fn api_key_var(provider: &str) -> Option<&'static str> {
    match provider {
        "anthropic" => Some("ANTHROPIC_API_KEY"),
        "openai" => Some("OPENAI_API_KEY"),
        _ => None,
    }
}

impl LlmClient {
    /// Create a new LLM client.
    /// Reads the API key from the appropriate env var based on provider.
    /// Returns None if the key is not set.
    pub fn new(config: LlmConfig, retry_config: RetryConfig) -> Option<Self> {
        let Some(env_var) = api_key_var(&config.provider) else {
            tracing::warn!(provider = %config.provider, "Unknown LLM provider");
            return None;
        };

        let api_key = match std::env::var(env_var) {
            Ok(key) if !key.trim().is_empty() => key,
            _ => {
                tracing::warn!(
                    env_var = env_var,
                    provider = config.provider.as_str(),
                    "API key not set, reasoning engine disabled"
                );
                return None;
            }
        };

        Self::with_api_key(config, retry_config, api_key)
    }

    /// Create a client with an explicit key. Returns None for unknown providers.
    pub fn with_api_key(
        config: LlmConfig,
        retry_config: RetryConfig,
        api_key: impl Into<String>,
    ) -> Option<Self> {
        api_key_var(&config.provider)?;

        let http = match reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
        {
            Ok(http) => http,
            Err(e) => {
                tracing::error!(error = %e, "Failed to build LLM HTTP client");
                return None;
            }
        };

        Some(Self {
            http,
            config,
            retry_config,
            api_key: api_key.into(),
        })
    }

    /// Send a chat request to the configured provider with retry logic.
    pub async fn chat(
        &self,
        messages: &[ChatMessage],
        max_output_tokens: u32,
    ) -> Result<String, LlmError> {
        let mut attempt = 0u32;
        let mut backoff_ms = self.retry_config.initial_backoff_ms;

        loop {
            attempt += 1;
            let result = self.send_once(messages, max_output_tokens).await;

            match result {
                Ok(reply) => {
                    if reply.stop_reason == StopReason::MaxTokens {
                        tracing::warn!(
                            max_output_tokens,
                            "LLM reply truncated at output token limit"
                        );
                    }
                    return Ok(reply.text);
                }
                Err(e) if e.is_non_retryable() => {
                    metrics::counter!("llm.api.errors", "provider" => self.config.provider.clone())
                        .increment(1);
                    return Err(e);
                }
                Err(LlmError::RateLimited { retry_after }) => {
                    if attempt >= self.retry_config.max_attempts {
                        metrics::counter!("llm.api.errors", "provider" => self.config.provider.clone())
                            .increment(1);
                        return Err(LlmError::RateLimited { retry_after });
                    }
                    let wait = rate_limit_wait(retry_after, backoff_ms, &self.retry_config);
                    tracing::warn!(attempt, wait_ms = wait, "LLM rate limited, retrying");
                    tokio::time::sleep(Duration::from_millis(wait)).await;
                }
                Err(e) => {
                    if attempt >= self.retry_config.max_attempts {
                        metrics::counter!("llm.api.errors", "provider" => self.config.provider.clone())
                            .increment(1);
                        return Err(e);
                    }
                    let jitter = if self.retry_config.jitter {
                        compute_jitter(attempt, backoff_ms)
                    } else {
                        0
                    };
                    let wait = backoff_ms + jitter;
                    tracing::warn!(attempt, wait_ms = wait, error = %e, "LLM API error, retrying");
                    tokio::time::sleep(Duration::from_millis(wait)).await;
                    backoff_ms = next_backoff(backoff_ms, &self.retry_config);
                }
            }
        }
    }

    /// Single attempt, routed to the provider-specific implementation.
    async fn send_once(
        &self,
        messages: &[ChatMessage],
        max_output_tokens: u32,
    ) -> Result<LlmReply, LlmError> {
        match self.config.provider.as_str() {
            "anthropic" => {
                anthropic::send_messages(
                    &self.http,
                    &self.api_key,
                    &self.config.model,
                    max_output_tokens,
                    self.config.temperature,
                    messages,
                )
                .await
            }
            "openai" => {
                openai::send_chat_completion(
                    &self.http,
                    &self.api_key,
                    &self.config.model,
                    max_output_tokens,
                    self.config.temperature,
                    messages,
                )
                .await
            }
            other => Err(LlmError::Api(format!("Unknown provider: {}", other))),
        }
    }
}

fn next_backoff(backoff_ms: u64, retry: &RetryConfig) -> u64 {
    ((backoff_ms as f64 * retry.backoff_multiplier) as u64).min(retry.max_backoff_ms)
}

/// Wait before retrying a rate-limited call. A server hint never exceeds the backoff cap.
fn rate_limit_wait(retry_after: Option<u64>, backoff_ms: u64, retry: &RetryConfig) -> u64 {
    retry_after
        .map(|s| s.saturating_mul(1000).min(retry.max_backoff_ms))
        .unwrap_or(backoff_ms)
}

/// Compute jitter for retry backoff using simple hash-based approach.
fn compute_jitter(attempt: u32, backoff_ms: u64) -> u64 {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::hash::DefaultHasher::new();
    attempt.hash(&mut hasher);
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos()
        .hash(&mut hasher);
    hasher.finish() % (backoff_ms / 2 + 1)
}

impl ReasoningEngine for LlmClient {
    fn chat<'a>(&'a self, messages: &'a [ChatMessage], max_output_tokens: u32) -> ChatFuture<'a> {
        Box::pin(self.chat(messages, max_output_tokens))
    }

    fn describe(&self) -> String {
        format!("{}/{}", self.config.provider, self.config.model)
    }
}

#[cfg(test)]
mod tests {
    use veracity_common::config::OutputTokenLimits;

    use super::*;

    fn llm_config(provider: &str) -> LlmConfig {
        LlmConfig {
            provider: provider.into(),
            model: "test-model".into(),
            temperature: None,
            request_timeout_seconds: 5,
            max_output_tokens: OutputTokenLimits::default(),
        }
    }

    #[test]
    fn test_unknown_provider_has_no_client() {
        assert!(
            LlmClient::with_api_key(llm_config("cohere"), RetryConfig::default(), "k").is_none()
        );
    }

    #[test]
    fn test_describe_names_provider_and_model() {
        let client =
            LlmClient::with_api_key(llm_config("openai"), RetryConfig::default(), "k").unwrap();
        assert_eq!(ReasoningEngine::describe(&client), "openai/test-model");
    }

    #[test]
    fn test_backoff_grows_and_caps() {
        let retry = RetryConfig {
            max_attempts: 5,
            initial_backoff_ms: 500,
            max_backoff_ms: 1500,
            backoff_multiplier: 2.0,
            jitter: false,
        };
        assert_eq!(next_backoff(500, &retry), 1000);
        assert_eq!(next_backoff(1000, &retry), 1500);
        assert_eq!(next_backoff(1500, &retry), 1500);
    }

    #[test]
    fn test_rate_limit_wait_capped() {
        let retry = RetryConfig {
            max_backoff_ms: 8000,
            ..RetryConfig::default()
        };
        assert_eq!(rate_limit_wait(Some(2), 500, &retry), 2000);
        assert_eq!(rate_limit_wait(Some(3600), 500, &retry), 8000);
        assert_eq!(rate_limit_wait(Some(u64::MAX), 500, &retry), 8000);
        assert_eq!(rate_limit_wait(None, 500, &retry), 500);
    }

    #[test]
    fn test_jitter_bounded_by_half_backoff() {
        for attempt in 1..20 {
            assert!(compute_jitter(attempt, 1000) <= 500);
        }
        assert_eq!(compute_jitter(1, 0), 0);
    }

    #[test]
    fn test_non_retryable_classification() {
        assert!(LlmError::Auth("bad key".into()).is_non_retryable());
        assert!(LlmError::Unconfigured.is_non_retryable());
        assert!(!LlmError::Http("reset".into()).is_non_retryable());
        assert!(!LlmError::RateLimited { retry_after: None }.is_non_retryable());
    }
}
