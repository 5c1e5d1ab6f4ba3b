use std::fmt;

use serde::{Deserialize, Serialize};

/// Max chars kept in an evidence title.
pub const TITLE_MAX_CHARS: usize = 200;
/// Max chars kept in an evidence snippet.
pub const SNIPPET_MAX_CHARS: usize = 800;
/// Placeholder for results without a title.
pub const DEFAULT_TITLE: &str = "Untitled";
/// Placeholder for results without an identifiable publisher.
pub const DEFAULT_SOURCE: &str = "Unknown source";

/// Identity of the evidence provider that produced a result.
///
/// Declaration order is the cascade priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    Serper,
    Google,
    Brave,
    Tavily,
    Searxng,
    Wikipedia,
}

impl ProviderId {
    /// All providers in cascade priority order.
    pub const PRIORITY: [ProviderId; 6] = [
        ProviderId::Serper,
        ProviderId::Google,
        ProviderId::Brave,
        ProviderId::Tavily,
        ProviderId::Searxng,
        ProviderId::Wikipedia,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Serper => "serper",
            Self::Google => "google",
            Self::Brave => "brave",
            Self::Tavily => "tavily",
            Self::Searxng => "searxng",
            Self::Wikipedia => "wikipedia",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized search result supporting or contradicting a claim.
///
/// Produced only by the evidence normalizer: `title` and `source` are never
/// empty, `snippet` is plain text with collapsed whitespace.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub source: String,
    pub provider: ProviderId,
}
