//! Release manifest composition
//!
//! Pure function of the module configuration, changelog text, HEAD commit and
//! the configured extra runtime versions. No I/O happens here except in
//! `read_changelog`, which the caller runs first.

use crate::checks::changelog_path;
use crate::core::config::ModuleConfig;
use crate::core::error::{ModResult, ResultExt};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::Path;

/// Registry channel a version is published to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseChannel {
  Alpha,
  Beta,
  Release,
}

impl ReleaseChannel {
  /// First match wins: `alpha`, then `beta`, otherwise `release`
  pub fn from_version(version: &str) -> Self {
    if version.contains("alpha") {
      ReleaseChannel::Alpha
    } else if version.contains("beta") {
      ReleaseChannel::Beta
    } else {
      ReleaseChannel::Release
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      ReleaseChannel::Alpha => "alpha",
      ReleaseChannel::Beta => "beta",
      ReleaseChannel::Release => "release",
    }
  }
}

impl fmt::Display for ReleaseChannel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Everything the registry needs to describe one published version
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseManifest {
  pub version_number: String,
  pub version_channel: ReleaseChannel,
  pub changelog_text: String,
  pub target_runtime_versions: Vec<String>,
  pub loaders: Vec<String>,
}

/// Build the manifest for `config`
///
/// `repository_url` must not end with `/`. Duplicate extra versions are kept.
pub fn compose_manifest(
  config: &ModuleConfig,
  changelog: &str,
  commit: &str,
  extra_versions: Option<&str>,
  repository_url: &str,
) -> ReleaseManifest {
  ReleaseManifest {
    version_number: format!("{}+{}", config.module_version, config.module_id),
    version_channel: ReleaseChannel::from_version(&config.module_version),
    changelog_text: compose_changelog(changelog, commit, repository_url),
    target_runtime_versions: target_versions(&config.target_runtime_version, extra_versions),
    loaders: config.platform.loaders(),
  }
}

fn compose_changelog(changelog: &str, commit: &str, repository_url: &str) -> String {
  let mut text = changelog.replace("\r\n", "\n");
  if !text.is_empty() && !text.ends_with('\n') {
    text.push('\n');
  }
  text.push_str(&format!("Commit: {}/commit/{}", repository_url, commit.trim()));
  text
}

fn target_versions(primary: &str, extra_versions: Option<&str>) -> Vec<String> {
  let mut versions = vec![primary.to_string()];
  if let Some(extra) = extra_versions {
    versions.extend(
      extra
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string),
    );
  }
  versions
}

/// Contents of the repository changelog, empty when there is none
pub fn read_changelog(repo_root: &Path) -> ModResult<String> {
  let path = changelog_path(repo_root);
  if !path.is_file() {
    log::warn!("{} not found, publishing without release notes", path.display());
    return Ok(String::new());
  }
  fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
}
