//! Local branch must match its upstream

use super::trait_def::{Check, CheckOutcome, GateContext};
use crate::core::config::Overrides;
use crate::core::error::{GateError, ModResult};

const BRANCH_AB_MARKER: &str = "branch.ab";

/// Ahead/behind counts from `git status -b --porcelain=2` output
///
/// Looks for a `# branch.ab +A -B` line. Returns `None` when there is no such
/// line or its counts do not parse.
pub fn parse_branch_ab(status: &str) -> Option<(i64, i64)> {
  status.lines().find_map(|line| {
    let parts: Vec<&str> = line.split(' ').collect();
    if parts.len() < 4 || parts[1] != BRANCH_AB_MARKER {
      return None;
    }
    let ahead = parts[2].parse::<i64>().ok()?;
    let behind = parts[3].parse::<i64>().ok()?;
    Some((ahead, behind))
  })
}

pub struct UnpushedChangesCheck;

impl Check for UnpushedChangesCheck {
  fn name(&self) -> &str {
    "unpushed-changes"
  }

  fn description(&self) -> &str {
    "Branch is in sync with its upstream"
  }

  fn run(&self, ctx: &GateContext<'_>) -> ModResult<CheckOutcome> {
    if ctx.ignore_changes {
      return Ok(CheckOutcome::Skipped(format!(
        "disabled by {}",
        Overrides::IGNORE_CHANGES_VAR
      )));
    }

    let status = ctx.source_control.status_branch_porcelain_v2()?;
    match parse_branch_ab(&status) {
      None => {
        log::debug!("no branch.ab line in status output");
        Ok(CheckOutcome::Passed("no tracking information".to_string()))
      }
      Some((0, 0)) => Ok(CheckOutcome::Passed("in sync with upstream".to_string())),
      Some((ahead, behind)) => Err(
        GateError::UnpushedChanges {
          ahead: ahead.unsigned_abs(),
          behind: behind.unsigned_abs(),
        }
        .into(),
      ),
    }
  }
}
