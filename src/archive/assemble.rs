//! Merge intermediate jars into one reproducible release jar
//!
//! Entries are copied in input order. Excluded paths are dropped before the
//! duplicate check, so build-tool manifests present in every input never
//! collide. Any other path written twice aborts the whole assembly and the
//! partial output is removed.

use super::normalize::JsonNormalizer;
use crate::core::config::ModuleConfig;
use crate::core::context::ModuleContext;
use crate::core::error::{ArchiveError, ConfigError, ModError, ModResult, ResultExt};
use crate::ui::progress::EntryProgress;
use glob::Pattern;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

/// Build-tool metadata dropped from every input
pub const DEFAULT_EXCLUDES: &[&str] = &["**/MANIFEST.MF"];

/// Structured text resources re-serialized in canonical form
pub const DEFAULT_NORMALIZE: &[&str] = &["**/*.json", "**/*.mcmeta"];

/// Excluded when the module uses data generation
pub const DATAGEN_EXCLUDE: &str = "**/datagen/**";

/// Path rules applied while assembling
#[derive(Debug, Clone)]
pub struct AssemblyRules {
  exclude: Vec<Pattern>,
  normalize: Vec<Pattern>,
}

impl AssemblyRules {
  /// Compile explicit rule sets
  pub fn new(exclude: &[&str], normalize: &[&str]) -> ModResult<Self> {
    Ok(Self {
      exclude: compile(exclude)?,
      normalize: compile(normalize)?,
    })
  }

  /// Default rules for a module
  pub fn for_module(config: &ModuleConfig) -> ModResult<Self> {
    let rules = Self::new(DEFAULT_EXCLUDES, DEFAULT_NORMALIZE)?;
    if config.uses_data_generation {
      return rules.with_exclusion(DATAGEN_EXCLUDE);
    }
    Ok(rules)
  }

  /// Add another exclusion pattern
  pub fn with_exclusion(mut self, pattern: &str) -> ModResult<Self> {
    self.exclude.extend(compile(&[pattern])?);
    Ok(self)
  }

  pub fn is_excluded(&self, path: &str) -> bool {
    self.exclude.iter().any(|p| p.matches(path))
  }

  pub fn should_normalize(&self, path: &str) -> bool {
    self.normalize.iter().any(|p| p.matches(path))
  }
}

fn compile(patterns: &[&str]) -> ModResult<Vec<Pattern>> {
  patterns
    .iter()
    .map(|raw| {
      Pattern::new(raw).map_err(|e| {
        ModError::from(ConfigError::InvalidValue {
          key: "pattern".to_string(),
          value: raw.to_string(),
          reason: e.to_string(),
        })
      })
    })
    .collect()
}

/// Outcome of a successful assembly
#[derive(Debug, Clone, serde::Serialize)]
pub struct AssemblyReport {
  pub output: PathBuf,
  pub entries_written: usize,
  pub entries_normalized: usize,
  pub entries_excluded: usize,
  pub sha256: String,
}

/// Merges input jars under a set of rules
pub struct ArchiveAssembler {
  rules: AssemblyRules,
  normalizer: JsonNormalizer,
  show_progress: bool,
}

impl ArchiveAssembler {
  pub fn new(rules: AssemblyRules) -> Self {
    Self {
      rules,
      normalizer: JsonNormalizer,
      show_progress: false,
    }
  }

  /// Draw a progress bar on stderr while copying entries
  pub fn with_progress(mut self, show: bool) -> Self {
    self.show_progress = show;
    self
  }

  /// Assemble `inputs` into `output`
  ///
  /// Creates the output's parent directory if needed. On failure no output
  /// file is left behind.
  pub fn assemble(&self, inputs: &[PathBuf], output: &Path) -> ModResult<AssemblyReport> {
    if inputs.is_empty() {
      return Err(ArchiveError::NoInputs.into());
    }
    for input in inputs {
      if !input.is_file() {
        return Err(ArchiveError::InputNotFound { path: input.clone() }.into());
      }
    }
    if let Ok(target) = fs::canonicalize(output)
      && inputs.iter().any(|input| fs::canonicalize(input).is_ok_and(|p| p == target))
    {
      return Err(ArchiveError::OutputIsInput { path: output.to_path_buf() }.into());
    }

    if let Some(parent) = output.parent()
      && !parent.as_os_str().is_empty()
    {
      fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let result = self.write_archive(inputs, output);
    if result.is_err() && output.exists() {
      log::debug!("removing partial output {}", output.display());
      let _ = fs::remove_file(output);
    }
    let mut report = result?;

    report.sha256 = sha256_file(output)?;
    log::info!(
      "assembled {} ({} entries, {} normalized, {} excluded)",
      output.display(),
      report.entries_written,
      report.entries_normalized,
      report.entries_excluded
    );
    Ok(report)
  }

  fn write_archive(&self, inputs: &[PathBuf], output: &Path) -> ModResult<AssemblyReport> {
    let mut archives = Vec::with_capacity(inputs.len());
    for input in inputs {
      let file = File::open(input).with_context(|| format!("Failed to open {}", input.display()))?;
      let archive = ZipArchive::new(file).map_err(|e| zip_error(input, e))?;
      archives.push((input, archive));
    }

    let total: usize = archives.iter().map(|(_, a)| a.len()).sum();
    let mut progress = if self.show_progress && total > 0 {
      Some(EntryProgress::new(total, format!("Assembling {} entries", total)))
    } else {
      None
    };

    let out_file = File::create(output).with_context(|| format!("Failed to create {}", output.display()))?;
    let mut writer = ZipWriter::new(out_file);
    let options = entry_options();

    let mut seen = HashSet::new();
    let mut report = AssemblyReport {
      output: output.to_path_buf(),
      entries_written: 0,
      entries_normalized: 0,
      entries_excluded: 0,
      sha256: String::new(),
    };

    for (input, archive) in archives.iter_mut() {
      let input: &Path = input.as_path();
      for index in 0..archive.len() {
        if let Some(ref mut p) = progress {
          p.inc();
        }

        let mut entry = archive.by_index(index).map_err(|e| zip_error(input, e))?;
        if entry.is_dir() {
          continue;
        }

        let name = entry.name().to_string();
        if self.rules.is_excluded(&name) {
          log::debug!("excluded {} from {}", name, input.display());
          report.entries_excluded += 1;
          continue;
        }

        if !seen.insert(name.clone()) {
          return Err(ArchiveError::DuplicateEntry { path: name }.into());
        }

        let mut content = Vec::with_capacity(entry.size() as usize);
        entry
          .read_to_end(&mut content)
          .with_context(|| format!("Failed to read {} from {}", name, input.display()))?;

        if self.rules.should_normalize(&name) {
          content = self
            .normalizer
            .normalize_bytes(&content)
            .map_err(|e| ArchiveError::NormalizationParse {
              path: name.clone(),
              reason: e.to_string(),
            })?;
          report.entries_normalized += 1;
        }

        writer.start_file(name.as_str(), options).map_err(|e| zip_error(output, e))?;
        writer
          .write_all(&content)
          .with_context(|| format!("Failed to write {}", name))?;
        report.entries_written += 1;
      }
    }

    let mut out_file = writer.finish().map_err(|e| zip_error(output, e))?;
    out_file.flush()?;
    Ok(report)
  }
}

/// Fixed per-entry options so identical input yields identical bytes
fn entry_options() -> SimpleFileOptions {
  SimpleFileOptions::default()
    .compression_method(CompressionMethod::Deflated)
    .last_modified_time(DateTime::default())
    .unix_permissions(0o644)
}

fn zip_error(path: &Path, err: zip::result::ZipError) -> ModError {
  ArchiveError::Zip {
    path: path.to_path_buf(),
    reason: err.to_string(),
  }
  .into()
}

/// Lowercase hex SHA-256 of a file
pub fn sha256_file(path: &Path) -> ModResult<String> {
  let mut file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
  let mut hasher = Sha256::new();
  let mut buffer = [0u8; 8192];
  loop {
    let read = file.read(&mut buffer)?;
    if read == 0 {
      break;
    }
    hasher.update(&buffer[..read]);
  }
  Ok(format!("{:x}", hasher.finalize()))
}

/// `{base}-{version}-{platform}.jar`
pub fn output_file_name(config: &ModuleConfig) -> String {
  format!(
    "{}-{}-{}.jar",
    config.archive_base_name(),
    config.module_version,
    config.platform.classifier()
  )
}

/// Jar produced by the upstream remap step, `build/libs/{base}-{version}-fat.jar`
pub fn default_input(ctx: &ModuleContext) -> PathBuf {
  ctx.libs_dir().join(format!(
    "{}-{}-{}.jar",
    ctx.config.archive_base_name(),
    ctx.config.module_version,
    ctx.config.platform.intermediate_classifier()
  ))
}
