use std::future::Future;
use std::pin::Pin;

use veracity_common::types::ProviderId;

use crate::outcome::ProviderOutcome;

/// Boxed future returned by provider searches.
pub type SearchFuture<'a> = Pin<Box<dyn Future<Output = ProviderOutcome> + Send + 'a>>;

/// One external search or knowledge source.
///
/// Object-safe so the cascade can hold a heterogeneous, ordered list.
/// Tests provide scripted providers; production uses the adapters in
/// `crate::providers`.
pub trait EvidenceProvider: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Whether the provider has what it needs to issue a request (credential,
    /// base URL). Unavailable providers are skipped without a call.
    fn is_available(&self) -> bool;

    /// Issue one search. Never fails: errors become `ProviderOutcome::Failed`.
    fn search<'a>(&'a self, query: &'a str, limit: usize) -> SearchFuture<'a>;
}
