//! Release notes must exist before anything is published

use super::trait_def::{Check, CheckOutcome, GateContext};
use crate::core::config::Overrides;
use crate::core::error::{GateError, ModResult, ResultExt};
use std::fs;
use std::path::{Path, PathBuf};

/// Changelog location, relative to the repository root
pub const CHANGELOG_FILE: &str = "changelog.md";

pub fn changelog_path(repo_root: &Path) -> PathBuf {
  repo_root.join(CHANGELOG_FILE)
}

pub struct DocumentationCheck;

impl Check for DocumentationCheck {
  fn name(&self) -> &str {
    "documentation"
  }

  fn description(&self) -> &str {
    "Release notes are present in the changelog"
  }

  fn run(&self, ctx: &GateContext<'_>) -> ModResult<CheckOutcome> {
    if ctx.ignore_changes {
      return Ok(CheckOutcome::Skipped(format!(
        "disabled by {}",
        Overrides::IGNORE_CHANGES_VAR
      )));
    }

    let path = changelog_path(ctx.repo_root);
    if !path.is_file() {
      return Err(GateError::DocumentationMissing { path }.into());
    }

    let content = fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    if content.trim().is_empty() {
      return Err(GateError::DocumentationMissing { path }.into());
    }

    Ok(CheckOutcome::Passed(format!("{} has release notes", CHANGELOG_FILE)))
  }
}
