//! Integration tests for `modrelease check`

use crate::helpers::{TestRepo, git, run_modrelease, run_modrelease_failing, run_modrelease_with_env};
use anyhow::Result;

fn ready_repo() -> Result<TestRepo> {
  let repo = TestRepo::new()?;
  repo.add_module("fabric", &[])?;
  repo.write_changelog("Fixed bugs.\n")?;
  repo.commit("Add fabric module")?;
  Ok(repo)
}

#[test]
fn test_check_clean_repository_passes() -> Result<()> {
  let repo = ready_repo()?;

  let output = run_modrelease(&repo.path, &["check", "--project-dir", "fabric"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("documentation"));
  assert!(stdout.contains("no tracking information"));
  assert!(stdout.contains("Ready to release"));
  Ok(())
}

#[test]
fn test_check_json_lists_checks_in_order() -> Result<()> {
  let repo = ready_repo()?;

  let output = run_modrelease(&repo.path, &["check", "--project-dir", "fabric", "--json"])?;
  let reports: serde_json::Value = serde_json::from_slice(&output.stdout)?;

  let names: Vec<_> = reports
    .as_array()
    .unwrap()
    .iter()
    .map(|r| r["check_name"].as_str().unwrap().to_string())
    .collect();
  assert_eq!(names, vec!["documentation", "uncommitted-changes", "unpushed-changes"]);
  assert_eq!(reports[0]["outcome"]["status"], "passed");
  Ok(())
}

#[test]
fn test_check_missing_changelog_fails() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.add_module("fabric", &[])?;
  repo.commit("Add fabric module")?;

  let output = run_modrelease_failing(&repo.path, &["check", "--project-dir", "fabric"], &[])?;

  assert_eq!(output.status.code(), Some(3));
  assert!(String::from_utf8_lossy(&output.stderr).contains("release notes"));
  Ok(())
}

#[test]
fn test_check_ignore_changes_skips_the_gate() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.add_module("fabric", &[])?;
  repo.commit("Add fabric module")?;
  repo.write_file("fabric/src/Dirty.java", "class Dirty {}\n")?;

  let output = run_modrelease_with_env(
    &repo.path,
    &["check", "--project-dir", "fabric"],
    &[("MOD_IGNORE_CHANGES", "true")],
  )?;

  let stdout = String::from_utf8_lossy(&output.stdout);
  assert_eq!(stdout.matches("MOD_IGNORE_CHANGES").count(), 3, "stdout: {}", stdout);
  Ok(())
}

#[test]
fn test_check_uncommitted_changes_fail() -> Result<()> {
  let repo = ready_repo()?;
  repo.write_file("fabric/src/Sample.java", "class Sample {}\n")?;

  let output = run_modrelease_failing(&repo.path, &["check", "--project-dir", "fabric"], &[])?;

  assert_eq!(output.status.code(), Some(3));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("uncommitted changes"), "stderr: {}", stderr);
  assert!(stderr.contains("fabric/"), "stderr: {}", stderr);
  Ok(())
}

#[test]
fn test_check_build_output_is_ignored() -> Result<()> {
  let repo = ready_repo()?;
  repo.write_jar("fabric/build/libs/sample-2.1.0-fat.jar", &[("a.txt", "a")])?;

  run_modrelease(&repo.path, &["check", "--project-dir", "fabric"])?;
  Ok(())
}

#[test]
fn test_check_unpushed_commit_fails() -> Result<()> {
  let repo = ready_repo()?;
  let _remote = repo.add_upstream()?;

  run_modrelease(&repo.path, &["check", "--project-dir", "fabric"])?;

  repo.write_changelog("Fixed more bugs.\n")?;
  repo.commit("Update changelog")?;

  let output = run_modrelease_failing(&repo.path, &["check", "--project-dir", "fabric"], &[])?;
  assert_eq!(output.status.code(), Some(3));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("un-pushed changes (ahead 1, behind 0)"), "stderr: {}", stderr);

  git(&repo.path, &["push"])?;
  run_modrelease(&repo.path, &["check", "--project-dir", "fabric"])?;
  Ok(())
}

#[test]
fn test_check_outside_repository_is_tool_error() -> Result<()> {
  let repo = ready_repo()?;
  let elsewhere = tempfile::TempDir::new()?;
  std::fs::write(elsewhere.path().join("changelog.md"), "notes\n")?;
  std::fs::copy(repo.path.join("gradle.properties"), elsewhere.path().join("gradle.properties"))?;
  let root = elsewhere.path().to_string_lossy().to_string();

  let output = run_modrelease_failing(
    &repo.path,
    &["check", "--project-dir", "fabric", "--repo-root", &root],
    &[],
  )?;

  assert_eq!(output.status.code(), Some(2));
  assert!(!String::from_utf8_lossy(&output.stderr).contains("uncommitted changes"));
  Ok(())
}
