use std::time::Duration;

use serde::Deserialize;

use veracity_common::config::{EvidenceConfig, ProviderCredentials};
use veracity_common::types::{EvidenceItem, ProviderId};

use crate::http::send_json;
use crate::normalize::{normalize, RawEvidence};
use crate::outcome::{ProviderFailure, ProviderOutcome};
use crate::provider::{EvidenceProvider, SearchFuture};

use super::RawResponse;

const BRAVE_SEARCH_URL: &str = "https://api.search.brave.com/res/v1/web/search";
const BRAVE_MAX_COUNT: usize = 20;

#[derive(Debug, Default, Deserialize)]
pub struct BraveResponse {
    #[serde(default)]
    web: Option<BraveWeb>,
}

#[derive(Debug, Deserialize)]
struct BraveWeb {
    #[serde(default)]
    results: Vec<BraveResult>,
}

#[derive(Debug, Deserialize)]
struct BraveResult {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    /// Contains `<strong>` highlighting.
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    profile: Option<BraveProfile>,
}

#[derive(Debug, Deserialize)]
struct BraveProfile {
    #[serde(default)]
    name: Option<String>,
}

impl BraveResponse {
    pub(super) fn into_evidence(self) -> Vec<EvidenceItem> {
        let Some(web) = self.web else {
            return Vec::new();
        };
        web.results
            .iter()
            .filter_map(|r| {
                normalize(
                    RawEvidence {
                        title: r.title.as_deref(),
                        url: r.url.as_deref(),
                        snippet: r.description.as_deref(),
                        source: r.profile.as_ref().and_then(|p| p.name.as_deref()),
                    },
                    ProviderId::Brave,
                )
            })
            .collect()
    }
}

/// Brave Search web results.
pub struct BraveProvider {
    http: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
    timeout: Duration,
}

impl BraveProvider {
    pub fn new(
        http: reqwest::Client,
        credentials: &ProviderCredentials,
        config: &EvidenceConfig,
    ) -> Self {
        Self {
            http,
            api_key: credentials.brave_api_key.clone(),
            endpoint: BRAVE_SEARCH_URL.to_string(),
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn fetch(&self, query: &str, limit: usize) -> Result<RawResponse, ProviderFailure> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderFailure::Unavailable("BRAVE_API_KEY not set".into()))?;

        let count = limit.clamp(1, BRAVE_MAX_COUNT).to_string();
        let request = self
            .http
            .get(&self.endpoint)
            .header("X-Subscription-Token", api_key)
            .header("Accept", "application/json")
            .query(&[("q", query), ("count", count.as_str())]);

        let raw: BraveResponse = send_json(ProviderId::Brave, request, self.timeout).await?;
        Ok(RawResponse::Brave(raw))
    }
}

impl EvidenceProvider for BraveProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Brave
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    fn search<'a>(&'a self, query: &'a str, limit: usize) -> SearchFuture<'a> {
        Box::pin(async move {
            ProviderOutcome::from(self.fetch(query, limit).await.map(|raw| raw.into_evidence(limit)))
        })
    }
}
