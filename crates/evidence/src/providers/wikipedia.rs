use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use veracity_common::config::EvidenceConfig;
use veracity_common::types::{EvidenceItem, ProviderId};

use crate::http::send_json;
use crate::normalize::{normalize, RawEvidence};
use crate::outcome::{ProviderFailure, ProviderOutcome};
use crate::provider::{EvidenceProvider, SearchFuture};

use super::RawResponse;

const WIKIPEDIA_SOURCE: &str = "Wikipedia";
/// CirrusSearch ANDs every term, so long sentences rarely match anything.
const MAX_QUERY_TERMS: usize = 8;

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "that", "with", "this", "from", "was", "were", "are", "has", "have",
    "had", "been", "its", "his", "her", "their", "which", "who", "will", "would", "said", "says",
    "not", "but", "into", "than", "then", "also", "about", "after", "over",
];

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Clone, Deserialize)]
struct SearchHit {
    title: String,
    /// HTML with `<span class="searchmatch">` highlighting.
    #[serde(default)]
    snippet: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct PageSummary {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    content_urls: Option<ContentUrls>,
}

#[derive(Debug, Clone, Deserialize)]
struct ContentUrls {
    desktop: Option<PageUrl>,
}

#[derive(Debug, Clone, Deserialize)]
struct PageUrl {
    page: Option<String>,
}

/// One search hit plus its summary, when the summary lookup succeeded.
#[derive(Debug)]
pub struct WikipediaPage {
    hit: SearchHit,
    summary: Option<PageSummary>,
    article_url: String,
}

/// Raw Wikipedia result: search hits in ranking order, each optionally enriched.
#[derive(Debug, Default)]
pub struct WikipediaResults {
    pages: Vec<WikipediaPage>,
}

impl WikipediaResults {
    pub(super) fn into_evidence(self) -> Vec<EvidenceItem> {
        self.pages
            .iter()
            .filter_map(|page| {
                let summary = page.summary.as_ref();
                let title = summary
                    .and_then(|s| s.title.as_deref())
                    .unwrap_or(&page.hit.title);
                let url = summary
                    .and_then(|s| s.content_urls.as_ref())
                    .and_then(|c| c.desktop.as_ref())
                    .and_then(|d| d.page.as_deref())
                    .unwrap_or(&page.article_url);
                let snippet = summary
                    .and_then(|s| s.extract.as_deref())
                    .filter(|e| !e.trim().is_empty())
                    .or(page.hit.snippet.as_deref());

                normalize(
                    RawEvidence {
                        title: Some(title),
                        url: Some(url),
                        snippet,
                        source: Some(WIKIPEDIA_SOURCE),
                    },
                    ProviderId::Wikipedia,
                )
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// Wikipedia full-text search with per-hit summary lookups.
///
/// Needs no credential and is always available, which makes it the cascade's
/// terminal fallback.
pub struct WikipediaProvider {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
    detail_concurrency: usize,
}

impl WikipediaProvider {
    pub fn new(http: reqwest::Client, config: &EvidenceConfig) -> Self {
        Self {
            http,
            base_url: format!("https://{}.wikipedia.org", config.wikipedia_language),
            timeout: Duration::from_secs(config.wikipedia_timeout_seconds),
            detail_concurrency: config.detail_fetch_concurrency.max(1) as usize,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn fetch(&self, query: &str, limit: usize) -> Result<RawResponse, ProviderFailure> {
        let terms = keyword_query(query);
        let srlimit = limit.max(1).to_string();
        let request = self
            .http
            .get(format!("{}/w/api.php", self.base_url))
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", terms.as_str()),
                ("srlimit", srlimit.as_str()),
                ("srprop", "snippet"),
                ("format", "json"),
                ("utf8", "1"),
            ]);

        let response: SearchResponse =
            send_json(ProviderId::Wikipedia, request, self.timeout).await?;

        let hits: Vec<SearchHit> = response
            .query
            .map(|q| q.search)
            .unwrap_or_default()
            .into_iter()
            .take(limit)
            .collect();

        let pages = self.fetch_summaries(hits).await;
        Ok(RawResponse::Wikipedia(WikipediaResults { pages }))
    }

    /// Look up a summary for every hit with bounded concurrency. A failed or
    /// timed-out lookup leaves that page snippet-only; order follows the hits.
    async fn fetch_summaries(&self, hits: Vec<SearchHit>) -> Vec<WikipediaPage> {
        let semaphore = Arc::new(Semaphore::new(self.detail_concurrency));
        let mut tasks = JoinSet::new();

        for (index, hit) in hits.iter().enumerate() {
            let Some(summary_url) = summary_url(&self.base_url, &hit.title) else {
                continue;
            };
            let http = self.http.clone();
            let timeout = self.timeout;
            let semaphore = Arc::clone(&semaphore);

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok()?;
                let request = http.get(summary_url);
                match send_json::<PageSummary>(ProviderId::Wikipedia, request, timeout).await {
                    Ok(summary) => Some((index, summary)),
                    Err(e) => {
                        tracing::debug!(index, error = %e, "Wikipedia summary lookup failed");
                        None
                    }
                }
            });
        }

        let mut summaries: Vec<Option<PageSummary>> = vec![None; hits.len()];
        while let Some(joined) = tasks.join_next().await {
            if let Ok(Some((index, summary))) = joined {
                summaries[index] = Some(summary);
            }
        }

        hits.into_iter()
            .zip(summaries)
            .map(|(hit, summary)| WikipediaPage {
                article_url: article_url(&self.base_url, &hit.title),
                hit,
                summary,
            })
            .collect()
    }
}

impl EvidenceProvider for WikipediaProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Wikipedia
    }

    fn is_available(&self) -> bool {
        true
    }

    fn search<'a>(&'a self, query: &'a str, limit: usize) -> SearchFuture<'a> {
        Box::pin(async move {
            ProviderOutcome::from(self.fetch(query, limit).await.map(|raw| raw.into_evidence(limit)))
        })
    }
}

/// Reduce a claim sentence to its distinctive terms.
fn keyword_query(claim: &str) -> String {
    let terms: Vec<&str> = claim
        .split(|c: char| !c.is_alphanumeric() && c != '-' && c != '\'')
        .map(|t| t.trim_matches(|c: char| c == '-' || c == '\''))
        .filter(|t| t.chars().count() > 2)
        .filter(|t| !STOPWORDS.contains(&t.to_lowercase().as_str()))
        .take(MAX_QUERY_TERMS)
        .collect();

    if terms.is_empty() {
        claim.trim().to_string()
    } else {
        terms.join(" ")
    }
}

fn summary_url(base_url: &str, title: &str) -> Option<reqwest::Url> {
    let page = title.replace(' ', "_");
    let mut url = reqwest::Url::parse(base_url).ok()?;
    url.path_segments_mut()
        .ok()?
        .pop_if_empty()
        .extend(["api", "rest_v1", "page", "summary", page.as_str()]);
    Some(url)
}

fn article_url(base_url: &str, title: &str) -> String {
    let page = title.replace(' ', "_");
    reqwest::Url::parse(base_url)
        .ok()
        .and_then(|mut url| {
            url.path_segments_mut()
                .ok()?
                .pop_if_empty()
                .extend(["wiki", page.as_str()]);
            Some(url.to_string())
        })
        .unwrap_or_else(|| format!("{}/wiki/{}", base_url, page))
}
