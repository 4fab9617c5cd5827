//! Check trait shared by every release precondition
//!
//! A check either passes, is skipped by an override, or returns a `GateError`
//! describing why the release cannot proceed. Tool failures surface as
//! `GitError` and are never reported as a failed check.

use crate::core::error::ModResult;
use crate::core::vcs::SourceControl;
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Non-failing result of a check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum CheckOutcome {
  Passed(String),
  Skipped(String),
}

impl CheckOutcome {
  pub fn message(&self) -> &str {
    match self {
      CheckOutcome::Passed(m) | CheckOutcome::Skipped(m) => m,
    }
  }
}

impl fmt::Display for CheckOutcome {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CheckOutcome::Passed(m) => write!(f, "passed: {}", m),
      CheckOutcome::Skipped(m) => write!(f, "skipped: {}", m),
    }
  }
}

/// Inputs available to every check
pub struct GateContext<'a> {
  /// Root of the work tree; the changelog lives here
  pub repo_root: &'a Path,
  pub source_control: &'a dyn SourceControl,
  /// Every check skipped for this run
  pub ignore_changes: bool,
}

/// A single release precondition
pub trait Check {
  /// Unique name for this check (kebab-case)
  fn name(&self) -> &str;

  fn description(&self) -> &str;

  /// Run the check; `Err` blocks the release
  fn run(&self, ctx: &GateContext<'_>) -> ModResult<CheckOutcome>;
}
