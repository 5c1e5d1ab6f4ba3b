mod analysis;
mod authorship;
mod claim;
mod evidence;
mod signals;
mod verdict;

pub use analysis::*;
pub use authorship::*;
pub use claim::*;
pub use evidence::*;
pub use signals::*;
pub use verdict::*;
