//! Module context - build once, pass everywhere
//!
//! Resolves the repository root, loads and layers the property files, and
//! validates the module configuration before any command runs. Commands take
//! `&ModuleContext` and never read properties or environment themselves.

use crate::core::config::{ModuleConfig, Overrides, PropertySource, ReleaseSettings};
use crate::core::error::{ModError, ModResult};
use crate::core::vcs::SystemGit;
use std::path::{Path, PathBuf};

/// Everything a command needs to know about the module it operates on
#[derive(Debug, Clone)]
pub struct ModuleContext {
  /// Module directory (holds the module's gradle.properties and build/)
  pub module_dir: PathBuf,

  /// Root of the git work tree the module lives in
  pub repo_root: PathBuf,

  /// Layered property source, kept for the release-only settings
  pub properties: PropertySource,

  /// Validated module configuration
  pub config: ModuleConfig,

  /// Process-level override flags
  pub overrides: Overrides,
}

impl ModuleContext {
  /// Build the context for `module_dir`
  ///
  /// When `repo_root` is not given, the enclosing git work tree is used; outside a
  /// repository the module directory stands in for it.
  pub fn build(
    module_dir: &Path,
    repo_root: Option<&Path>,
    property_overrides: &[(String, String)],
    overrides: Overrides,
  ) -> ModResult<Self> {
    if !module_dir.is_dir() {
      return Err(ModError::with_help(
        format!("Module directory not found: {}", module_dir.display()),
        "Pass the module directory with --project-dir",
      ));
    }

    let repo_root = match repo_root {
      Some(root) => root.to_path_buf(),
      None => match SystemGit::open(module_dir) {
        Ok(git) => git.root().to_path_buf(),
        Err(e) => {
          log::debug!("no enclosing git repository ({}), using module dir as root", e);
          module_dir.to_path_buf()
        }
      },
    };

    let properties = PropertySource::load_layered(&repo_root, module_dir, property_overrides)?;
    log::debug!("resolved {} properties for {}", properties.key_count(), module_dir.display());

    let config = ModuleConfig::from_properties(&properties)?;
    log::info!(
      "configured module '{}' {} for {} (minecraft {})",
      config.module_id,
      config.module_version,
      config.platform,
      config.target_runtime_version
    );

    Ok(Self {
      module_dir: module_dir.to_path_buf(),
      repo_root,
      properties,
      config,
      overrides,
    })
  }

  /// Release-only settings, validated on demand
  pub fn release_settings(&self) -> ModResult<ReleaseSettings> {
    Ok(ReleaseSettings::from_properties(&self.properties)?)
  }

  /// Default directory for built jars
  pub fn libs_dir(&self) -> PathBuf {
    self.module_dir.join("build").join("libs")
  }
}
