//! `modrelease check` - run the release gate without releasing

use crate::checks::{CheckOutcome, GateContext, GateReport, create_release_gate};
use crate::core::context::ModuleContext;
use crate::core::error::ModResult;
use crate::core::vcs::SystemGit;

/// Run every release precondition against the module's repository
pub fn run_gate(ctx: &ModuleContext) -> ModResult<Vec<GateReport>> {
  let git = SystemGit::new(&ctx.repo_root);
  let gate_ctx = GateContext {
    repo_root: &ctx.repo_root,
    source_control: &git,
    ignore_changes: ctx.overrides.ignore_changes,
  };
  create_release_gate().run(&gate_ctx)
}

/// Run the check command
pub fn run_check(ctx: &ModuleContext, json: bool) -> ModResult<()> {
  if !json {
    println!("🔍 Checking release preconditions in {}", ctx.repo_root.display());
  }

  let reports = run_gate(ctx)?;

  if json {
    println!("{}", serde_json::to_string_pretty(&reports)?);
  } else {
    print_reports(&reports);
    println!("\n✅ Ready to release");
  }
  Ok(())
}

pub(crate) fn print_reports(reports: &[GateReport]) {
  for report in reports {
    let icon = match report.outcome {
      CheckOutcome::Passed(_) => "✅",
      CheckOutcome::Skipped(_) => "⏭️ ",
    };
    println!("  {} {}: {}", icon, report.check_name, report.outcome.message());
  }
}
