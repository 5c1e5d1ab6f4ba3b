use serde::{Deserialize, Serialize};

use super::EvidenceItem;

/// A short, checkable factual statement extracted from the input text.
///
/// Evidence order is the provider's relevance ranking; the first item is the
/// cascade's top result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub text: String,
    #[serde(default)]
    pub evidence: Vec<EvidenceItem>,
}

impl Claim {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into().trim().to_string(),
            evidence: Vec::new(),
        }
    }

    /// Attach the cascade's result set. Consumes the claim so evidence is set once.
    pub fn with_evidence(self, evidence: Vec<EvidenceItem>) -> Self {
        Self { evidence, ..self }
    }

    pub fn has_evidence(&self) -> bool {
        !self.evidence.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProviderId;

    #[test]
    fn test_new_trims_text() {
        let claim = Claim::new("  The Eiffel Tower is in Paris.  ");
        assert_eq!(claim.text, "The Eiffel Tower is in Paris.");
        assert!(!claim.has_evidence());
    }

    #[test]
    fn test_with_evidence_preserves_order() {
        let item = |title: &str| EvidenceItem {
            title: title.into(),
            url: "https://example.com".into(),
            snippet: "snippet".into(),
            source: "example.com".into(),
            provider: ProviderId::Serper,
        };
        let claim = Claim::new("Water boils at 100C at sea level.")
            .with_evidence(vec![item("first"), item("second")]);
        assert!(claim.has_evidence());
        assert_eq!(claim.evidence[0].title, "first");
        assert_eq!(claim.evidence[1].title, "second");
    }
}
