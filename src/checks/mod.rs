//! Release preconditions
//!
//! Every check implements the `Check` trait and is registered in
//! `create_release_gate()`. The gate runs them in a fixed order and aborts on
//! the first failure:
//!
//! - **documentation**: `changelog.md` at the repository root has release notes
//! - **uncommitted-changes**: `git status --porcelain` prints nothing
//! - **unpushed-changes**: `# branch.ab` reports zero ahead and zero behind

mod documentation;
mod runner;
mod trait_def;
mod uncommitted;
mod unpushed;

pub use documentation::changelog_path;
pub use runner::{GateReport, create_release_gate};
pub use trait_def::{CheckOutcome, GateContext};
