use std::time::Duration;

use serde::{Deserialize, Serialize};

use veracity_common::config::{EvidenceConfig, ProviderCredentials};
use veracity_common::types::{EvidenceItem, ProviderId};

use crate::http::send_json;
use crate::normalize::{normalize, RawEvidence};
use crate::outcome::{ProviderFailure, ProviderOutcome};
use crate::provider::{EvidenceProvider, SearchFuture};

use super::RawResponse;

const TAVILY_SEARCH_URL: &str = "https://api.tavily.com/search";

#[derive(Serialize)]
struct TavilyRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
    search_depth: &'a str,
}

#[derive(Debug, Default, Deserialize)]
pub struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

impl TavilyResponse {
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
                    ProviderId::Tavily,
                )
            })
            .collect()
    }
}

/// Tavily research-oriented search API.
pub struct TavilyProvider {
    http: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
    timeout: Duration,
}

impl TavilyProvider {
    pub fn new(
        http: reqwest::Client,
        credentials: &ProviderCredentials,
        config: &EvidenceConfig,
    ) -> Self {
        Self {
            http,
            api_key: credentials.tavily_api_key.clone(),
            endpoint: TAVILY_SEARCH_URL.to_string(),
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
            .ok_or_else(|| ProviderFailure::Unavailable("TAVILY_API_KEY not set".into()))?;

        let request = self.http.post(&self.endpoint).json(&TavilyRequest {
            api_key,
            query,
            max_results: limit,
            search_depth: "basic",
        });

        let raw: TavilyResponse = send_json(ProviderId::Tavily, request, self.timeout).await?;
        Ok(RawResponse::Tavily(raw))
    }
}

impl EvidenceProvider for TavilyProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Tavily
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

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    use super::*;
    use crate::providers::test_server::serve;

    #[test]
    fn test_parse_tavily_response() {
        let json = r#"{
            "query": "ozone layer recovery",
            "answer": null,
            "results": [
                {"title": "Ozone recovery on track", "url": "https://www.unep.org/news/ozone", "content": "The ozone layer is on track to recover within four decades.", "score": 0.97},
                {"title": "", "url": "", "content": ""}
            ],
            "response_time": 1.2
        }"#;

        let raw: TavilyResponse = serde_json::from_str(json).unwrap();
        let items = raw.into_evidence();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].source, "unep.org");
        assert_eq!(items[0].provider, ProviderId::Tavily);
    }

    /// Stand-in for the Tavily search API recording each request body.
    async fn spawn_fake_tavily(seen: Arc<Mutex<Vec<Value>>>) -> String {
        let app = Router::new()
            .route(
                "/search",
                post(move |Json(body): Json<Value>| {
                    let seen = Arc::clone(&seen);
                    async move {
                        seen.lock().unwrap().push(body);
                        Json(json!({
                            "query": "great wall length",
                            "results": [
                                {"title": "Great Wall", "url": "https://www.nationalgeographic.com/great-wall", "content": "The wall stretches 21,196 km.", "score": 0.92}
                            ]
                        }))
                    }
                }),
            )
            .route(
                "/limited",
                post(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
            );
        serve(app).await
    }

    fn keyed() -> TavilyProvider {
        let credentials = ProviderCredentials {
            tavily_api_key: Some("tvly-key".into()),
            ..Default::default()
        };
        TavilyProvider::new(reqwest::Client::new(), &credentials, &EvidenceConfig::default())
    }

    #[tokio::test]
    async fn test_search_sends_key_in_body() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let base = spawn_fake_tavily(Arc::clone(&seen)).await;

        let items = keyed()
            .with_endpoint(format!("{}/search", base))
            .search("great wall length", 5)
            .await
            .into_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].source, "nationalgeographic.com");

        let seen = seen.lock().unwrap();
        assert_eq!(
            seen[0],
            json!({
                "api_key": "tvly-key",
                "query": "great wall length",
                "max_results": 5,
                "search_depth": "basic"
            })
        );
    }

    #[tokio::test]
    async fn test_rate_limit_is_status_failure() {
        let base = spawn_fake_tavily(Arc::new(Mutex::new(Vec::new()))).await;
        let outcome = keyed()
            .with_endpoint(format!("{}/limited", base))
            .search("great wall length", 5)
            .await;
        assert_eq!(outcome, ProviderOutcome::Failed(ProviderFailure::Status(429)));
    }
}
