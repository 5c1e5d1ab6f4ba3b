use veracity_common::types::EvidenceItem;

/// Why a provider produced no evidence.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderFailure {
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    #[error("request timed out")]
    Timeout,

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("upstream returned status {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Decode(String),
}

/// Result of one provider search. Adapters never return `Err`; every failure
/// is folded into `Failed` so the cascade can move on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderOutcome {
    Found(Vec<EvidenceItem>),
    Empty,
    Failed(ProviderFailure),
}

impl ProviderOutcome {
    pub fn from_items(items: Vec<EvidenceItem>) -> Self {
        if items.is_empty() {
            Self::Empty
        } else {
            Self::Found(items)
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Found(items) => items.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Plain evidence view: failures and empty results both become an empty list.
    pub fn into_items(self) -> Vec<EvidenceItem> {
        match self {
            Self::Found(items) => items,
            _ => Vec::new(),
        }
    }
}

impl From<Result<Vec<EvidenceItem>, ProviderFailure>> for ProviderOutcome {
    fn from(result: Result<Vec<EvidenceItem>, ProviderFailure>) -> Self {
        match result {
            Ok(items) => Self::from_items(items),
            Err(e) => Self::Failed(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veracity_common::types::ProviderId;

    fn item() -> EvidenceItem {
        EvidenceItem {
            title: "t".into(),
            url: "https://example.com".into(),
            snippet: "s".into(),
            source: "example.com".into(),
            provider: ProviderId::Brave,
        }
    }

    #[test]
    fn test_from_items_empty_is_empty() {
        assert_eq!(ProviderOutcome::from_items(Vec::new()), ProviderOutcome::Empty);
        assert_eq!(ProviderOutcome::from_items(vec![item()]).len(), 1);
    }

    #[test]
    fn test_failure_yields_no_items() {
        let outcome: ProviderOutcome = Err(ProviderFailure::Status(503)).into();
        assert!(outcome.is_failure());
        assert!(outcome.is_empty());
        assert!(outcome.into_items().is_empty());
    }
}
