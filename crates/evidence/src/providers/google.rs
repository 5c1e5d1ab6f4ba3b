use std::time::Duration;

use serde::Deserialize;

use veracity_common::config::{EvidenceConfig, ProviderCredentials};
use veracity_common::types::{EvidenceItem, ProviderId};

use crate::http::send_json;
use crate::normalize::{normalize, RawEvidence};
use crate::outcome::{ProviderFailure, ProviderOutcome};
use crate::provider::{EvidenceProvider, SearchFuture};

use super::RawResponse;

const GOOGLE_CSE_URL: &str = "https://www.googleapis.com/customsearch/v1";
/// The Custom Search JSON API rejects `num` above 10.
const GOOGLE_MAX_NUM: usize = 10;

#[derive(Debug, Default, Deserialize)]
pub struct GoogleResponse {
    #[serde(default)]
    items: Vec<GoogleItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleItem {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
    #[serde(default)]
    display_link: Option<String>,
}

impl GoogleResponse {
    pub(super) fn into_evidence(self) -> Vec<EvidenceItem> {
        self.items
            .iter()
            .filter_map(|r| {
                let source = r
                    .display_link
                    .as_deref()
                    .map(|s| s.strip_prefix("www.").unwrap_or(s));
                normalize(
                    RawEvidence {
                        title: r.title.as_deref(),
                        url: r.link.as_deref(),
                        snippet: r.snippet.as_deref(),
                        source,
                    },
                    ProviderId::Google,
                )
            })
            .collect()
    }
}

/// Google Programmable Search Engine (Custom Search JSON API).
pub struct GoogleProvider {
    http: reqwest::Client,
    api_key: Option<String>,
    engine_id: Option<String>,
    endpoint: String,
    timeout: Duration,
}

impl GoogleProvider {
    pub fn new(
        http: reqwest::Client,
        credentials: &ProviderCredentials,
        config: &EvidenceConfig,
    ) -> Self {
        Self {
            http,
            api_key: credentials.google_api_key.clone(),
            engine_id: credentials.google_cse_id.clone(),
            endpoint: GOOGLE_CSE_URL.to_string(),
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn fetch(&self, query: &str, limit: usize) -> Result<RawResponse, ProviderFailure> {
        let (Some(key), Some(cx)) = (self.api_key.as_deref(), self.engine_id.as_deref()) else {
            return Err(ProviderFailure::Unavailable(
                "GOOGLE_API_KEY or GOOGLE_CSE_ID not set".into(),
            ));
        };

        let num = limit.clamp(1, GOOGLE_MAX_NUM).to_string();
        let request = self
            .http
            .get(&self.endpoint)
            .query(&[("key", key), ("cx", cx), ("q", query), ("num", num.as_str())]);

        let raw: GoogleResponse = send_json(ProviderId::Google, request, self.timeout).await?;
        Ok(RawResponse::Google(raw))
    }
}

impl EvidenceProvider for GoogleProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Google
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some() && self.engine_id.is_some()
    }

    fn search<'a>(&'a self, query: &'a str, limit: usize) -> SearchFuture<'a> {
        Box::pin(async move {
            ProviderOutcome::from(self.fetch(query, limit).await.map(|raw| raw.into_evidence(limit)))
        })
    }
}
