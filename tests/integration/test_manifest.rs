//! Integration tests for `modrelease manifest`

use crate::helpers::{REPOSITORY_URL, TestRepo, run_modrelease, run_modrelease_failing};
use anyhow::Result;
use serde_json::json;

#[test]
fn test_manifest_for_head() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.add_module("fabric", &[])?;
  repo.write_changelog("Fixed bugs.\n")?;
  let head = repo.commit("Release 2.1.0")?;

  let output = run_modrelease(&repo.path, &["manifest", "--project-dir", "fabric", "--json"])?;
  let manifest: serde_json::Value = serde_json::from_slice(&output.stdout)?;

  assert_eq!(
    manifest,
    json!({
      "version_number": "2.1.0+sample",
      "version_channel": "release",
      "changelog_text": format!("Fixed bugs.\nCommit: {}/commit/{}", REPOSITORY_URL, head),
      "target_runtime_versions": ["1.20.1"],
      "loaders": ["fabric"],
    })
  );
  Ok(())
}

#[test]
fn test_manifest_overrides_and_extra_versions() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.add_module("neoforge", &[("template.extraGameVersions", "1.20.2, ,1.20.1")])?;
  repo.write_changelog("- one\r\n- two\r\n")?;

  let output = run_modrelease(
    &repo.path,
    &[
      "manifest",
      "--project-dir",
      "neoforge",
      "-P",
      "mod_version=1.0.0-alpha.2-beta",
      "--commit",
      "abc123",
      "--json",
    ],
  )?;
  let manifest: serde_json::Value = serde_json::from_slice(&output.stdout)?;

  assert_eq!(manifest["version_number"], "1.0.0-alpha.2-beta+sample");
  assert_eq!(manifest["version_channel"], "alpha");
  assert_eq!(
    manifest["changelog_text"],
    format!("- one\n- two\nCommit: {}/commit/abc123", REPOSITORY_URL)
  );
  assert_eq!(manifest["target_runtime_versions"], json!(["1.20.1", "1.20.2", "1.20.1"]));
  assert_eq!(manifest["loaders"], json!(["neoforge"]));
  Ok(())
}

#[test]
fn test_manifest_text_output() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.add_module("fabric", &[("mod_version", "3.0.0-beta.1")])?;
  repo.write_changelog("Beta notes\n")?;

  let output = run_modrelease(&repo.path, &["manifest", "--project-dir", "fabric", "--commit", "abc123"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("AbCdEf12"));
  assert!(stdout.contains("3.0.0-beta.1+sample"));
  assert!(stdout.contains("beta"));
  Ok(())
}

#[test]
fn test_manifest_missing_release_settings() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.add_module("fabric", &[])?;
  repo.write_file(
    "gradle.properties",
    "mod_id=sample\nmod_version=2.1.0\nminecraft_version=1.20.1\n",
  )?;

  let output = run_modrelease_failing(
    &repo.path,
    &["manifest", "--project-dir", "fabric", "--commit", "abc123"],
    &[],
  )?;

  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("template.repositoryUrl"));
  Ok(())
}

#[test]
fn test_unknown_platform_is_config_error() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.add_module("quilt", &[])?;

  let output = run_modrelease_failing(&repo.path, &["manifest", "--project-dir", "quilt"], &[])?;

  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("quilt"));
  Ok(())
}
