//! Working tree must be clean

use super::trait_def::{Check, CheckOutcome, GateContext};
use crate::core::config::Overrides;
use crate::core::error::{GateError, ModResult};

/// Lines of status output shown in the error
const SAMPLE_LINES: usize = 10;

/// True when porcelain status output lists anything at all
pub fn has_uncommitted_changes(status: &str) -> bool {
  status.lines().any(|line| !line.trim().is_empty())
}

pub struct UncommittedChangesCheck;

impl Check for UncommittedChangesCheck {
  fn name(&self) -> &str {
    "uncommitted-changes"
  }

  fn description(&self) -> &str {
    "No uncommitted changes in the working tree"
  }

  fn run(&self, ctx: &GateContext<'_>) -> ModResult<CheckOutcome> {
    if ctx.ignore_changes {
      return Ok(CheckOutcome::Skipped(format!(
        "disabled by {}",
        Overrides::IGNORE_CHANGES_VAR
      )));
    }

    let status = ctx.source_control.status_porcelain()?;
    if !has_uncommitted_changes(&status) {
      return Ok(CheckOutcome::Passed("working tree clean".to_string()));
    }

    let changed: Vec<&str> = status.lines().filter(|l| !l.trim().is_empty()).collect();
    let mut sample = changed.iter().take(SAMPLE_LINES).copied().collect::<Vec<_>>().join("\n");
    if changed.len() > SAMPLE_LINES {
      sample.push_str(&format!("\n... and {} more", changed.len() - SAMPLE_LINES));
    }
    Err(GateError::UncommittedChanges { sample }.into())
  }
}
