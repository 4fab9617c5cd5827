//! `modrelease manifest` - show what would be published

use crate::core::config::ReleaseSettings;
use crate::core::context::ModuleContext;
use crate::core::error::ModResult;
use crate::core::vcs::{SourceControl, SystemGit};
use crate::release::{ReleaseManifest, compose_manifest, read_changelog};

/// Compose the manifest for the current checkout
///
/// `commit` overrides the HEAD lookup.
pub fn build_manifest(ctx: &ModuleContext, settings: &ReleaseSettings, commit: Option<&str>) -> ModResult<ReleaseManifest> {
  let commit = match commit {
    Some(commit) => commit.to_string(),
    None => SystemGit::new(&ctx.repo_root).head_commit()?,
  };
  let changelog = read_changelog(&ctx.repo_root)?;

  Ok(compose_manifest(
    &ctx.config,
    &changelog,
    &commit,
    settings.extra_versions.as_deref(),
    &settings.repository_url,
  ))
}

/// Run the manifest command
pub fn run_manifest(ctx: &ModuleContext, commit: Option<String>, json: bool) -> ModResult<()> {
  let settings = ctx.release_settings()?;
  let manifest = build_manifest(ctx, &settings, commit.as_deref())?;

  if json {
    println!("{}", serde_json::to_string_pretty(&manifest)?);
  } else {
    print_manifest(&manifest, &settings.project_id);
  }
  Ok(())
}

pub(crate) fn print_manifest(manifest: &ReleaseManifest, project_id: &str) {
  println!("📋 Release manifest for project {}", project_id);
  println!("  Version:  {}", manifest.version_number);
  println!("  Channel:  {}", manifest.version_channel);
  println!("  Game:     {}", manifest.target_runtime_versions.join(", "));
  println!("  Loaders:  {}", manifest.loaders.join(", "));
  println!("  Changelog:");
  for line in manifest.changelog_text.lines() {
    println!("    {}", line);
  }
}
