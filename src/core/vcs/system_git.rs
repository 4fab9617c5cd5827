//! System git backend
//!
//! Every query is a blocking `git` subprocess with no timeout. A git binary
//! that cannot be spawned and one that exits non-zero are reported as
//! different errors, and neither is ever read as "the tree is dirty".

use super::SourceControl;
use crate::core::error::{GitError, ModResult};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Git backend using system git
pub struct SystemGit {
  /// Repository working directory
  pub(crate) repo_path: PathBuf,
}

impl SystemGit {
  /// Use `path` as the repository directory without probing it
  pub fn new(path: &Path) -> Self {
    Self {
      repo_path: path.to_path_buf(),
    }
  }

  /// Open a git repository rooted at the enclosing work tree of `path`
  pub fn open(path: &Path) -> ModResult<Self> {
    let probe = Self::new(path);
    let top = probe.run(&["rev-parse", "--show-toplevel"])?;

    Ok(Self {
      repo_path: PathBuf::from(top.trim()),
    })
  }

  /// Repository root
  pub fn root(&self) -> &Path {
    &self.repo_path
  }

  /// Run git with `args` and return stdout
  fn run(&self, args: &[&str]) -> ModResult<String> {
    let command = format!("git {}", args.join(" "));
    log::debug!("running `{}` in {}", command, self.repo_path.display());

    let output = self.git_cmd().args(args).output().map_err(|e| GitError::ToolUnavailable {
      command: command.clone(),
      reason: e.to_string(),
    })?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(
        GitError::CommandFailed {
          command,
          stderr: stderr.to_string(),
        }
        .into(),
      );
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
  }

  /// Create a safe git command with isolated environment
  ///
  /// - Sets working directory to repo path
  /// - Clears environment variables
  /// - Whitelists only PATH and HOME
  /// - Adds safe configuration overrides
  pub(crate) fn git_cmd(&self) -> Command {
    let mut cmd = Command::new("git");

    cmd.arg("-C").arg(&self.repo_path);

    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
      cmd.env("PATH", path);
    }
    if let Ok(home) = std::env::var("HOME") {
      cmd.env("HOME", home);
    }

    cmd.arg("-c").arg("core.quotePath=false");
    cmd.arg("-c").arg("color.status=false");

    cmd
  }
}

impl SourceControl for SystemGit {
  fn status_porcelain(&self) -> ModResult<String> {
    self.run(&["status", "--porcelain"])
  }

  fn status_branch_porcelain_v2(&self) -> ModResult<String> {
    self.run(&["status", "-b", "--porcelain=2"])
  }

  fn head_commit(&self) -> ModResult<String> {
    Ok(self.run(&["rev-parse", "HEAD"])?.trim().to_string())
  }
}
