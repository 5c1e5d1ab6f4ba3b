mod brave;
mod google;
mod searxng;
mod serper;
mod tavily;
#[cfg(test)]
mod test_server;
mod wikipedia;

use std::sync::Arc;

use veracity_common::config::{EvidenceConfig, ProviderCredentials};
use veracity_common::types::EvidenceItem;

use crate::provider::EvidenceProvider;

pub use brave::{BraveProvider, BraveResponse};
pub use google::{GoogleProvider, GoogleResponse};
pub use searxng::{SearxngProvider, SearxngResponse};
pub use serper::{SerperProvider, SerperResponse};
pub use tavily::{TavilyProvider, TavilyResponse};
pub use wikipedia::{WikipediaProvider, WikipediaResults};

/// A provider's undecoded result set, tagged by the adapter that fetched it.
///
/// Each variant maps into evidence with its own rules; no shape sniffing.
#[derive(Debug)]
pub enum RawResponse {
    Serper(SerperResponse),
    Google(GoogleResponse),
    Brave(BraveResponse),
    Tavily(TavilyResponse),
    Searxng(SearxngResponse),
    Wikipedia(WikipediaResults),
}

impl RawResponse {
    /// Normalize into at most `limit` evidence items, preserving provider ranking.
    pub fn into_evidence(self, limit: usize) -> Vec<EvidenceItem> {
        let items = match self {
            Self::Serper(raw) => raw.into_evidence(),
            Self::Google(raw) => raw.into_evidence(),
            Self::Brave(raw) => raw.into_evidence(),
            Self::Tavily(raw) => raw.into_evidence(),
            Self::Searxng(raw) => raw.into_evidence(),
            Self::Wikipedia(raw) => raw.into_evidence(),
        };
        items.into_iter().take(limit).collect()
    }
}

/// Build every adapter in cascade priority order.
pub fn default_providers(
    http: &reqwest::Client,
    credentials: &ProviderCredentials,
    config: &EvidenceConfig,
) -> Vec<Arc<dyn EvidenceProvider>> {
    vec![
        Arc::new(SerperProvider::new(http.clone(), credentials, config)),
        Arc::new(GoogleProvider::new(http.clone(), credentials, config)),
        Arc::new(BraveProvider::new(http.clone(), credentials, config)),
        Arc::new(TavilyProvider::new(http.clone(), credentials, config)),
        Arc::new(SearxngProvider::new(http.clone(), credentials, config)),
        Arc::new(WikipediaProvider::new(http.clone(), config)),
    ]
}

#[cfg(test)]
mod tests {
    use veracity_common::types::ProviderId;

    use super::*;

    #[test]
    fn test_default_providers_in_priority_order() {
        let providers = default_providers(
            &reqwest::Client::new(),
            &ProviderCredentials::default(),
            &EvidenceConfig::default(),
        );
        let ids: Vec<ProviderId> = providers.iter().map(|p| p.id()).collect();
        assert_eq!(ids, ProviderId::PRIORITY.to_vec());

        // Without credentials only the encyclopedia remains usable.
        let available: Vec<ProviderId> = providers
            .iter()
            .filter(|p| p.is_available())
            .map(|p| p.id())
            .collect();
        assert_eq!(available, vec![ProviderId::Wikipedia]);
    }

    #[test]
    fn test_raw_response_respects_limit() {
        let raw: SerperResponse = serde_json::from_str(
            r#"{"organic": [
                {"title": "a", "link": "https://a.com"},
                {"title": "b", "link": "https://b.com"},
                {"title": "c", "link": "https://c.com"}
            ]}"#,
        )
        .unwrap();
        let wrapped = RawResponse::Serper(raw);
        assert_eq!(wrapped.into_evidence(2).len(), 2);
    }
}
