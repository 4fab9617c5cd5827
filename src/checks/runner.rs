//! Release gate: run every precondition in order, stop at the first failure

use super::documentation::DocumentationCheck;
use super::trait_def::{Check, CheckOutcome, GateContext};
use super::uncommitted::UncommittedChangesCheck;
use super::unpushed::UnpushedChangesCheck;
use crate::core::error::ModResult;
use serde::Serialize;

/// Outcome of one check within a gate run
#[derive(Debug, Clone, Serialize)]
pub struct GateReport {
  pub check_name: String,
  pub description: String,
  pub outcome: CheckOutcome,
}

/// Ordered list of checks that all must pass
pub struct ReleaseGate {
  checks: Vec<Box<dyn Check>>,
}

impl ReleaseGate {
  pub fn new() -> Self {
    Self { checks: Vec::new() }
  }

  pub fn add_check(&mut self, check: Box<dyn Check>) {
    self.checks.push(check);
  }

  #[cfg(test)]
  pub fn checks(&self) -> impl Iterator<Item = &dyn Check> {
    self.checks.iter().map(|c| c.as_ref())
  }

  /// Run all checks in order
  ///
  /// The first error is returned as-is and later checks never run.
  pub fn run(&self, ctx: &GateContext<'_>) -> ModResult<Vec<GateReport>> {
    let mut reports = Vec::with_capacity(self.checks.len());
    for check in &self.checks {
      log::debug!("running check {}", check.name());
      let outcome = check.run(ctx)?;
      log::info!("check {} {}", check.name(), outcome);
      reports.push(GateReport {
        check_name: check.name().to_string(),
        description: check.description().to_string(),
        outcome,
      });
    }
    Ok(reports)
  }
}

impl Default for ReleaseGate {
  fn default() -> Self {
    Self::new()
  }
}

/// Gate with the built-in checks: documentation, uncommitted, unpushed
pub fn create_release_gate() -> ReleaseGate {
  let mut gate = ReleaseGate::new();
  gate.add_check(Box::new(DocumentationCheck));
  gate.add_check(Box::new(UncommittedChangesCheck));
  gate.add_check(Box::new(UnpushedChangesCheck));
  gate
}
