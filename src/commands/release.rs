//! `modrelease release` - gate, assemble, compose, publish
//!
//! Stages run strictly in order. A failed gate means nothing is assembled and
//! nothing is published; a failed publish leaves the assembled jar in place.

use super::assemble::{AssembleOptions, assemble_release_jar, print_report};
use super::check::{print_reports, run_gate};
use super::manifest::{build_manifest, print_manifest};
use crate::core::context::ModuleContext;
use crate::core::error::{ModError, ModResult};
use crate::release::{PublishRequest, Publisher};

/// Run the release command
pub fn run_release(ctx: &ModuleContext, options: AssembleOptions, dry_run: bool, publisher: &dyn Publisher) -> ModResult<()> {
  let config = &ctx.config;
  if !config.produces_release_artifact {
    println!(
      "⏭️  {} does not produce a release artifact, skipped",
      config.module_id
    );
    return Ok(());
  }

  let settings = ctx.release_settings()?;

  println!("🔍 Checking release preconditions");
  let reports = run_gate(ctx)?;
  print_reports(&reports);

  println!("\n📦 Assembling {} {} for {}", config.module_id, config.module_version, config.platform);
  let report = assemble_release_jar(ctx, &options, true)?;
  print_report(&report);

  println!();
  let manifest = build_manifest(ctx, &settings, None)?;
  print_manifest(&manifest, &settings.project_id);

  if dry_run {
    println!("\n🔍 Dry-run mode (nothing published)");
    return Ok(());
  }

  let request = PublishRequest {
    artifact: report.output.clone(),
    manifest,
    project_id: settings.project_id.clone(),
  };

  println!("\n🚀 Publishing {}", request.manifest.version_number);
  let receipt = publisher.publish(&request).map_err(|e| ModError::Publish {
    reason: format!("{:#}", e),
  })?;

  match receipt.version_id {
    Some(id) => println!("✅ Published {} (version id {})", request.manifest.version_number, id),
    None if receipt.debug => println!("✅ Debug publish finished, nothing uploaded"),
    None => println!("✅ Published {}", request.manifest.version_number),
  }
  Ok(())
}
