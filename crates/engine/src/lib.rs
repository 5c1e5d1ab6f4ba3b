//! Claim extraction, verification and authorship estimation for the Veracity
//! credibility service.

pub mod authorship;
pub mod claims;
pub mod config;
pub mod credibility;
pub mod interpret;
pub mod llm;
pub mod pipeline;
pub mod prompts;
pub mod routes;
pub mod verification;

pub use pipeline::{Pipeline, PipelineError};
