use std::sync::Arc;

use veracity_common::config::{EvidenceConfig, ProviderCredentials};
use veracity_common::types::{EvidenceItem, ProviderId};

use crate::outcome::ProviderOutcome;
use crate::provider::EvidenceProvider;
use crate::providers::default_providers;

/// Ordered, short-circuiting sequence of provider attempts for one claim.
pub struct EvidenceCascade {
    /// Priority order: first entry is tried first.
    providers: Vec<Arc<dyn EvidenceProvider>>,
    result_limit: usize,
    sufficiency_threshold: usize,
    min_query_chars: usize,
}

impl EvidenceCascade {
    /// Build a cascade over the given providers, tried in the order supplied.
    pub fn new(providers: Vec<Arc<dyn EvidenceProvider>>, config: &EvidenceConfig) -> Self {
        Self {
            providers,
            result_limit: config.result_limit.max(1) as usize,
            sufficiency_threshold: config.sufficiency_threshold.max(1) as usize,
            min_query_chars: config.min_query_chars as usize,
        }
    }

    /// Build the production cascade with every adapter.
    pub fn from_config(
        http: &reqwest::Client,
        credentials: &ProviderCredentials,
        config: &EvidenceConfig,
    ) -> Self {
        Self::new(default_providers(http, credentials, config), config)
    }

    /// Providers whose availability predicate currently holds, in priority order.
    pub fn available_providers(&self) -> Vec<ProviderId> {
        self.providers
            .iter()
            .filter(|p| p.is_available())
            .map(|p| p.id())
            .collect()
    }

    /// Gather evidence for one claim.
    ///
    /// The first provider reaching the sufficiency threshold wins outright and
    /// lower-priority providers are never called. Otherwise the largest partial
    /// result set is returned (earliest provider on ties), or nothing.
    pub async fn retrieve(&self, claim: &str) -> Vec<EvidenceItem> {
        let query = claim.trim();
        if query.chars().count() < self.min_query_chars {
            tracing::debug!(
                chars = query.chars().count(),
                "Claim too short for evidence retrieval"
            );
            return Vec::new();
        }

        let mut best: Vec<EvidenceItem> = Vec::new();
        let mut best_provider: Option<ProviderId> = None;

        for provider in &self.providers {
            let id = provider.id();
            if !provider.is_available() {
                tracing::debug!(provider = %id, "Provider unavailable, skipping");
                continue;
            }

            metrics::counter!("evidence.provider.requests", "provider" => id.as_str())
                .increment(1);

            match provider.search(query, self.result_limit).await {
                ProviderOutcome::Found(items) => {
                    tracing::debug!(provider = %id, count = items.len(), "Provider returned evidence");
                    if items.len() >= self.sufficiency_threshold {
                        record_result(id, items.len());
                        return items;
                    }
                    if items.len() > best.len() {
                        best = items;
                        best_provider = Some(id);
                    }
                }
                ProviderOutcome::Empty => {
                    tracing::debug!(provider = %id, "Provider returned no evidence");
                }
                ProviderOutcome::Failed(e) => {
                    metrics::counter!("evidence.provider.failures", "provider" => id.as_str())
                        .increment(1);
                    tracing::warn!(provider = %id, error = %e, "Evidence provider failed");
                }
            }
        }

        match best_provider {
            Some(id) => {
                tracing::info!(
                    provider = %id,
                    count = best.len(),
                    "No provider reached sufficiency, using best partial result"
                );
                record_result(id, best.len());
            }
            None => {
                tracing::info!("No evidence found for claim");
                metrics::counter!("evidence.cascade.exhausted").increment(1);
            }
        }

        best
    }
}

fn record_result(provider: ProviderId, count: usize) {
    metrics::counter!("evidence.cascade.results", "provider" => provider.as_str()).increment(1);
    metrics::histogram!("evidence.cascade.items").record(count as f64);
}
