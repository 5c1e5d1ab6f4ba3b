//! Interpretation of free-form reasoning-engine output.

pub mod fields;
pub mod recovery;
pub mod verdicts;

pub use recovery::{recover_object, RecoveryStrategy, Recovered};
pub use verdicts::{interpret_verdicts, ParseFailure, VerdictReport};
