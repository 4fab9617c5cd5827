//! Source-control queries used by the release gate and metadata composer
//!
//! The gate only ever needs three answers from the repository: the porcelain
//! status, the branch-tracking status, and the HEAD commit. They sit behind
//! `SourceControl` so checks can be exercised without a real repository.

pub mod system_git;

pub use system_git::SystemGit;

use crate::core::error::ModResult;

/// Line-oriented source-control queries
pub trait SourceControl {
  /// Output of `git status --porcelain`
  fn status_porcelain(&self) -> ModResult<String>;

  /// Output of `git status -b --porcelain=2`
  fn status_branch_porcelain_v2(&self) -> ModResult<String>;

  /// Full SHA of HEAD
  fn head_commit(&self) -> ModResult<String>;
}
