use std::time::Duration;

use serde::{Deserialize, Serialize};

use veracity_common::config::{EvidenceConfig, ProviderCredentials};
use veracity_common::types::{EvidenceItem, ProviderId};

use crate::http::send_json;
use crate::normalize::{normalize, RawEvidence};
use crate::outcome::{ProviderFailure, ProviderOutcome};
use crate::provider::{EvidenceProvider, SearchFuture};

use super::RawResponse;

const SERPER_SEARCH_URL: &str = "https://google.serper.dev/search";

#[derive(Serialize)]
struct SerperRequest<'a> {
    q: &'a str,
    num: usize,
}

/// Raw Serper response. Only the organic results are used.
#[derive(Debug, Default, Deserialize)]
pub struct SerperResponse {
    #[serde(default)]
    organic: Vec<SerperResult>,
}

#[derive(Debug, Deserialize)]
struct SerperResult {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
    #[serde(default)]
    source: Option<String>,
}

impl SerperResponse {
    pub(super) fn into_evidence(self) -> Vec<EvidenceItem> {
        self.organic
            .iter()
            .filter_map(|r| {
                normalize(
                    RawEvidence {
                        title: r.title.as_deref(),
                        url: r.link.as_deref(),
                        snippet: r.snippet.as_deref(),
                        source: r.source.as_deref(),
                    },
                    ProviderId::Serper,
                )
            })
            .collect()
    }
}

/// Google results via serper.dev.
pub struct SerperProvider {
    http: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
    timeout: Duration,
}

impl SerperProvider {
    pub fn new(
        http: reqwest::Client,
        credentials: &ProviderCredentials,
        config: &EvidenceConfig,
    ) -> Self {
        Self {
            http,
            api_key: credentials.serper_api_key.clone(),
            endpoint: SERPER_SEARCH_URL.to_string(),
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
            .ok_or_else(|| ProviderFailure::Unavailable("SERPER_API_KEY not set".into()))?;

        let request = self
            .http
            .post(&self.endpoint)
            .header("X-API-KEY", api_key)
            .json(&SerperRequest {
                q: query,
                num: limit,
            });

        let raw: SerperResponse = send_json(ProviderId::Serper, request, self.timeout).await?;
        Ok(RawResponse::Serper(raw))
    }
}

impl EvidenceProvider for SerperProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Serper
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
