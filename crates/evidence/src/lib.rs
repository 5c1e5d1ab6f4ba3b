//! Evidence retrieval: provider adapters, result normalization and the
//! short-circuiting provider cascade.

pub mod cascade;
mod http;
pub mod normalize;
pub mod outcome;
pub mod provider;
pub mod providers;

pub use cascade::EvidenceCascade;
pub use outcome::{ProviderFailure, ProviderOutcome};
pub use provider::{EvidenceProvider, SearchFuture};
