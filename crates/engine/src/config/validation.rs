use veracity_common::config::RetryConfig;

use super::loader::{ConfigError, EngineConfig};

/// Validate the complete engine configuration.
///
/// Checks sane ranges on numeric parameters. The service refuses to start
/// on validation failure.
pub fn validate(config: &EngineConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_server(config, &mut errors);
    validate_llm(config, &mut errors);
    validate_retry(&config.system.retry, &mut errors);
    validate_evidence(config, &mut errors);
    validate_claims(config, &mut errors);
    validate_verification(config, &mut errors);
    validate_authorship(config, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Validation(errors.join("; ")))
    }
}

fn validate_server(config: &EngineConfig, errors: &mut Vec<String>) {
    if config.system.server.port == 0 {
        errors.push("server.port must be > 0".into());
    }
}

fn validate_llm(config: &EngineConfig, errors: &mut Vec<String>) {
    let llm = &config.system.llm;

    if !matches!(llm.provider.as_str(), "anthropic" | "openai") {
        errors.push(format!(
            "llm.provider must be \"anthropic\" or \"openai\", got \"{}\"",
            llm.provider
        ));
    }
    if llm.model.is_empty() {
        errors.push("llm.model must not be empty".into());
    }
    if let Some(temp) = llm.temperature {
        if !(0.0..=2.0).contains(&temp) {
            errors.push("llm.temperature must be between 0.0 and 2.0".into());
        }
    }
    if llm.request_timeout_seconds == 0 {
        errors.push("llm.request_timeout_seconds must be > 0".into());
    }

    let tokens = &llm.max_output_tokens;
    for (name, value) in [
        ("claims", tokens.claims),
        ("verification", tokens.verification),
        ("authorship", tokens.authorship),
    ] {
        if value == 0 {
            errors.push(format!("llm.max_output_tokens.{} must be > 0", name));
        }
    }
}

fn validate_retry(rc: &RetryConfig, errors: &mut Vec<String>) {
    if rc.max_attempts == 0 {
        errors.push("retry.max_attempts must be > 0".into());
    }
    if rc.initial_backoff_ms == 0 {
        errors.push("retry.initial_backoff_ms must be > 0".into());
    }
    if rc.max_backoff_ms < rc.initial_backoff_ms {
        errors.push("retry.max_backoff_ms must be >= initial_backoff_ms".into());
    }
    if rc.backoff_multiplier < 1.0 {
        errors.push("retry.backoff_multiplier must be >= 1.0".into());
    }
}

fn validate_evidence(config: &EngineConfig, errors: &mut Vec<String>) {
    let e = &config.system.evidence;

    if e.result_limit == 0 {
        errors.push("evidence.result_limit must be > 0".into());
    }
    if e.sufficiency_threshold == 0 {
        errors.push("evidence.sufficiency_threshold must be > 0".into());
    }
    if e.sufficiency_threshold > e.result_limit {
        errors.push("evidence.sufficiency_threshold must be <= result_limit".into());
    }
    if e.timeout_seconds == 0 {
        errors.push("evidence.timeout_seconds must be > 0".into());
    }
    if e.wikipedia_timeout_seconds == 0 {
        errors.push("evidence.wikipedia_timeout_seconds must be > 0".into());
    }
    if e.detail_fetch_concurrency == 0 {
        errors.push("evidence.detail_fetch_concurrency must be > 0".into());
    }
    if e.wikipedia_language.is_empty()
        || !e.wikipedia_language.chars().all(|c| c.is_ascii_alphabetic() || c == '-')
    {
        errors.push("evidence.wikipedia_language must be a language code like \"en\"".into());
    }
}

fn validate_claims(config: &EngineConfig, errors: &mut Vec<String>) {
    if config.system.claims.max_claims == 0 {
        errors.push("claims.max_claims must be > 0".into());
    }
}

fn validate_verification(config: &EngineConfig, errors: &mut Vec<String>) {
    let v = &config.system.verification;

    if v.max_snippet_chars == 0 {
        errors.push("verification.max_snippet_chars must be > 0".into());
    }
    if v.max_text_chars == 0 {
        errors.push("verification.max_text_chars must be > 0".into());
    }
}

fn validate_authorship(config: &EngineConfig, errors: &mut Vec<String>) {
    let threshold = config.system.authorship.ai_threshold;
    if threshold == 0 || threshold > 100 {
        errors.push("authorship.ai_threshold must be between 1 and 100".into());
    }
}
