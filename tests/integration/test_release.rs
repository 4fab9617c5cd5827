//! Integration tests for `modrelease release`

use crate::helpers::{OneShotRegistry, TestRepo, run_modrelease, run_modrelease_failing, run_modrelease_with_env};
use anyhow::Result;

const FAT_JAR: &str = "fabric/build/libs/sample-2.1.0-fat.jar";
const RELEASE_JAR: &str = "fabric/build/libs/sample-2.1.0-fabric.jar";

fn ready_repo() -> Result<TestRepo> {
  let repo = TestRepo::new()?;
  repo.add_module("fabric", &[])?;
  repo.write_changelog("Fixed bugs.\n")?;
  repo.commit("Release 2.1.0")?;
  repo.write_jar(
    FAT_JAR,
    &[
      ("META-INF/MANIFEST.MF", "Manifest-Version: 1.0\n"),
      ("fabric.mod.json", "{ \"id\": \"sample\" }"),
    ],
  )?;
  Ok(repo)
}

#[test]
fn test_release_dry_run() -> Result<()> {
  let repo = ready_repo()?;

  let output = run_modrelease(&repo.path, &["release", "--project-dir", "fabric", "--dry-run"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("2.1.0+sample"), "stdout: {}", stdout);
  assert!(stdout.contains("Dry-run"), "stdout: {}", stdout);
  assert!(repo.path.join(RELEASE_JAR).exists());
  Ok(())
}

#[test]
fn test_release_debug_upload() -> Result<()> {
  let repo = ready_repo()?;

  let output = run_modrelease_with_env(
    &repo.path,
    &["release", "--project-dir", "fabric"],
    &[("MOD_UPLOAD_DEBUG", "true")],
  )?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("Debug mode"), "stdout: {}", stdout);
  assert!(stdout.contains("\"project_id\": \"AbCdEf12\""), "stdout: {}", stdout);
  Ok(())
}

#[test]
fn test_release_gate_failure_prevents_assembly() -> Result<()> {
  let repo = ready_repo()?;
  repo.write_changelog("Fixed bugs.\nAnd more.\n")?;

  let output = run_modrelease_failing(&repo.path, &["release", "--project-dir", "fabric", "--dry-run"], &[])?;

  assert_eq!(output.status.code(), Some(3));
  assert!(String::from_utf8_lossy(&output.stderr).contains("uncommitted changes"));
  assert!(!repo.path.join(RELEASE_JAR).exists());
  Ok(())
}

#[test]
fn test_release_publish_failure_keeps_archive() -> Result<()> {
  let repo = ready_repo()?;

  let output = run_modrelease_failing(&repo.path, &["release", "--project-dir", "fabric"], &[])?;

  assert_eq!(output.status.code(), Some(2));
  assert!(String::from_utf8_lossy(&output.stderr).contains("MODRINTH_TOKEN"));
  assert!(repo.path.join(RELEASE_JAR).exists());
  Ok(())
}

#[test]
fn test_release_registry_rejection_is_reported_verbatim() -> Result<()> {
  let repo = ready_repo()?;
  let registry = OneShotRegistry::start("400 Bad Request", r#"{"error":"invalid_input"}"#)?;

  let output = run_modrelease_failing(
    &repo.path,
    &["release", "--project-dir", "fabric"],
    &[("MODRINTH_TOKEN", "tok"), ("MODRINTH_API_URL", registry.base_url.as_str())],
  )?;

  assert_eq!(output.status.code(), Some(2));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("400"), "stderr: {}", stderr);
  assert!(stderr.contains(r#"{"error":"invalid_input"}"#), "stderr: {}", stderr);

  let received = registry.received()?;

  assert!(received.starts_with("POST /v2/version "), "{}", received);
  assert!(received.to_ascii_lowercase().contains("\r\nauthorization: tok\r\n"));
  assert!(received.contains("name=\"data\""));
  assert!(received.contains("name=\"file\""));
  assert!(repo.path.join(RELEASE_JAR).exists());
  Ok(())
}

#[test]
fn test_release_skipped_without_artifact_flag() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.add_module("fabric", &[("template.producesReleaseArtifact", "false")])?;

  let output = run_modrelease(&repo.path, &["release", "--project-dir", "fabric"])?;

  assert!(String::from_utf8_lossy(&output.stdout).contains("skipped"));
  Ok(())
}
