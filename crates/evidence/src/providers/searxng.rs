use std::time::Duration;

use serde::Deserialize;

use veracity_common::config::{EvidenceConfig, ProviderCredentials};
use veracity_common::types::{EvidenceItem, ProviderId};

use crate::http::send_json;
use crate::normalize::{normalize, RawEvidence};
use crate::outcome::{ProviderFailure, ProviderOutcome};
use crate::provider::{EvidenceProvider, SearchFuture};

use super::RawResponse;

#[derive(Debug, Default, Deserialize)]
pub struct SearxngResponse {
    #[serde(default)]
    results: Vec<SearxngResult>,
}

#[derive(Debug, Deserialize)]
struct SearxngResult {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

impl SearxngResponse {
    pub(super) fn into_evidence(self) -> Vec<EvidenceItem> {
        self.results
            .iter()
            .filter_map(|r| {
                normalize(
                    RawEvidence {
                        title: r.title.as_deref(),
                        url: r.url.as_deref(),
                        snippet: r.content.as_deref(),
                        source: None,
                    },
                    ProviderId::Searxng,
                )
            })
            .collect()
    }
}

/// Self-hosted SearXNG metasearch instance (JSON output format must be enabled).
pub struct SearxngProvider {
    http: reqwest::Client,
    base_url: Option<String>,
    timeout: Duration,
}

impl SearxngProvider {
    pub fn new(
        http: reqwest::Client,
        credentials: &ProviderCredentials,
        config: &EvidenceConfig,
    ) -> Self {
        Self {
            http,
            base_url: credentials.searxng_url.clone(),
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }

    async fn fetch(&self, query: &str) -> Result<RawResponse, ProviderFailure> {
        let base = self
            .base_url
            .as_deref()
            .ok_or_else(|| ProviderFailure::Unavailable("SEARXNG_URL not set".into()))?;

        let search_url = format!("{}/search", base.trim_end_matches('/'));
        let request = self
            .http
            .get(&search_url)
            .query(&[("q", query), ("format", "json")]);

        let raw: SearxngResponse = send_json(ProviderId::Searxng, request, self.timeout).await?;
        Ok(RawResponse::Searxng(raw))
    }
}

impl EvidenceProvider for SearxngProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Searxng
    }

    fn is_available(&self) -> bool {
        self.base_url.is_some()
    }

    fn search<'a>(&'a self, query: &'a str, limit: usize) -> SearchFuture<'a> {
        Box::pin(async move {
            ProviderOutcome::from(self.fetch(query).await.map(|raw| raw.into_evidence(limit)))
        })
    }
}
