//! `modrelease assemble` - build the release jar

use crate::archive::assemble::{default_input, output_file_name};
use crate::archive::{ArchiveAssembler, AssemblyReport, AssemblyRules};
use crate::core::context::ModuleContext;
use crate::core::error::ModResult;
use std::io::IsTerminal;
use std::path::PathBuf;

/// Where and how to assemble
#[derive(Debug, Clone, Default)]
pub struct AssembleOptions {
  /// Input jars; empty means the remap step's default output
  pub inputs: Vec<PathBuf>,
  /// Output directory; `None` means `build/libs`
  pub output_dir: Option<PathBuf>,
  /// Extra exclusion globs
  pub excludes: Vec<String>,
}

/// Assemble the module's release jar
pub fn assemble_release_jar(ctx: &ModuleContext, options: &AssembleOptions, show_progress: bool) -> ModResult<AssemblyReport> {
  let inputs = if options.inputs.is_empty() {
    vec![default_input(ctx)]
  } else {
    options.inputs.clone()
  };

  let mut rules = AssemblyRules::for_module(&ctx.config)?;
  for pattern in &options.excludes {
    rules = rules.with_exclusion(pattern)?;
  }

  let output_dir = options.output_dir.clone().unwrap_or_else(|| ctx.libs_dir());
  let output = output_dir.join(output_file_name(&ctx.config));

  log::info!("assembling {} input(s) into {}", inputs.len(), output.display());
  ArchiveAssembler::new(rules)
    .with_progress(show_progress && std::io::stderr().is_terminal())
    .assemble(&inputs, &output)
}

/// Run the assemble command
pub fn run_assemble(ctx: &ModuleContext, options: AssembleOptions, json: bool) -> ModResult<()> {
  if !json {
    println!(
      "📦 Assembling {} {} for {}",
      ctx.config.module_id, ctx.config.module_version, ctx.config.platform
    );
  }

  let report = assemble_release_jar(ctx, &options, !json)?;

  if json {
    println!("{}", serde_json::to_string_pretty(&report)?);
  } else {
    print_report(&report);
  }
  Ok(())
}

pub(crate) fn print_report(report: &AssemblyReport) {
  println!("✅ Wrote {}", report.output.display());
  println!(
    "   {} entries ({} normalized, {} excluded)",
    report.entries_written, report.entries_normalized, report.entries_excluded
  );
  println!("   sha256 {}", report.sha256);
}
