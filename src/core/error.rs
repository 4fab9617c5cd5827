//! Error types for modrelease with contextual messages and exit codes
//!
//! Every stage of the pipeline (configuration, assembly, release gate, publishing)
//! has its own error family so a failure is diagnosable from the message alone.
//! Nothing is retried: errors propagate straight to `main` and end the run.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for modrelease
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, missing files)
  User = 1,
  /// System error (git, network, I/O)
  System = 2,
  /// Validation failure (release gate, packaging input)
  Validation = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for modrelease
#[derive(Debug)]
pub enum ModError {
  /// Configuration errors
  Config(ConfigError),

  /// Archive assembly errors
  Archive(ArchiveError),

  /// Release precondition failures
  Gate(GateError),

  /// Source-control tool errors
  Git(GitError),

  /// Publisher failure, reported verbatim
  Publish { reason: String },

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl ModError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ModError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    ModError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  ///
  /// Typed errors keep their own message; only free-form messages and I/O errors
  /// pick up the context line.
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      ModError::Message { message, context, help } => ModError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      ModError::Io(e) => ModError::Message {
        message: ctx_str,
        context: Some(format!("I/O error: {}", e)),
        help: None,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      ModError::Config(_) => ExitCode::User,
      ModError::Archive(ArchiveError::InputNotFound { .. }) => ExitCode::User,
      ModError::Archive(ArchiveError::NoInputs) => ExitCode::User,
      ModError::Archive(ArchiveError::OutputIsInput { .. }) => ExitCode::User,
      ModError::Archive(ArchiveError::Zip { .. }) => ExitCode::System,
      ModError::Archive(_) => ExitCode::Validation,
      ModError::Gate(_) => ExitCode::Validation,
      ModError::Git(_) => ExitCode::System,
      ModError::Publish { .. } => ExitCode::System,
      ModError::Io(_) => ExitCode::System,
      ModError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ModError::Config(e) => e.help_message(),
      ModError::Archive(e) => e.help_message(),
      ModError::Gate(e) => e.help_message(),
      ModError::Git(e) => e.help_message(),
      ModError::Publish { .. } => {
        Some("The local archive was kept. Check the registry before re-running the release.".to_string())
      }
      ModError::Message { help, .. } => help.clone(),
      ModError::Io(_) => None,
    }
  }
}

impl fmt::Display for ModError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ModError::Config(e) => write!(f, "{}", e),
      ModError::Archive(e) => write!(f, "{}", e),
      ModError::Gate(e) => write!(f, "{}", e),
      ModError::Git(e) => write!(f, "{}", e),
      ModError::Publish { reason } => write!(f, "Publishing failed: {}", reason),
      ModError::Io(e) => write!(f, "I/O error: {}", e),
      ModError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for ModError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ModError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for ModError {
  fn from(err: io::Error) -> Self {
    ModError::Io(err)
  }
}

impl From<ConfigError> for ModError {
  fn from(err: ConfigError) -> Self {
    ModError::Config(err)
  }
}

impl From<ArchiveError> for ModError {
  fn from(err: ArchiveError) -> Self {
    ModError::Archive(err)
  }
}

impl From<GateError> for ModError {
  fn from(err: GateError) -> Self {
    ModError::Gate(err)
  }
}

impl From<GitError> for ModError {
  fn from(err: GitError) -> Self {
    ModError::Git(err)
  }
}

impl From<serde_json::Error> for ModError {
  fn from(err: serde_json::Error) -> Self {
    ModError::message(format!("JSON error: {}", err))
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// Required property absent or blank
  MissingKey { key: String },

  /// Property present but unusable
  InvalidValue { key: String, value: String, reason: String },

  /// `template.platform` names a platform we do not package for
  UnsupportedPlatform { value: String },

  /// Property file explicitly requested but absent
  PropertiesNotFound { path: PathBuf },

  /// Property file could not be parsed
  Parse { path: PathBuf, reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::MissingKey { key } => Some(format!(
        "Add `{}=<value>` to gradle.properties or pass `-P {}=<value>`.",
        key, key
      )),
      ConfigError::UnsupportedPlatform { .. } => {
        Some("Supported values for template.platform: fabric, neoforge".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::MissingKey { key } => write!(f, "Missing required property: {}", key),
      ConfigError::InvalidValue { key, value, reason } => {
        write!(f, "Invalid value '{}' for property {}: {}", value, key, reason)
      }
      ConfigError::UnsupportedPlatform { value } => {
        write!(f, "Invalid template.platform value: {}", value)
      }
      ConfigError::PropertiesNotFound { path } => {
        write!(f, "Property file not found: {}", path.display())
      }
      ConfigError::Parse { path, reason } => {
        write!(f, "Failed to parse {}: {}", path.display(), reason)
      }
    }
  }
}

/// Archive assembly errors
#[derive(Debug)]
pub enum ArchiveError {
  /// Two non-excluded entries target the same output path
  DuplicateEntry { path: String },

  /// An entry routed through the normalizer is not valid JSON
  NormalizationParse { path: String, reason: String },

  /// Nothing to assemble
  NoInputs,

  /// Input archive does not exist
  InputNotFound { path: PathBuf },

  /// Zip container could not be read or written
  Zip { path: PathBuf, reason: String },

  /// Output path is also one of the inputs
  OutputIsInput { path: PathBuf },
}

impl ArchiveError {
  fn help_message(&self) -> Option<String> {
    match self {
      ArchiveError::DuplicateEntry { .. } => Some(
        "Merged inputs must have disjoint entries. Check the upstream jar tasks for overlapping resources."
          .to_string(),
      ),
      ArchiveError::NormalizationParse { .. } => {
        Some("Only well-formed JSON resources may match the normalization rules.".to_string())
      }
      ArchiveError::InputNotFound { .. } => {
        Some("Build the remapped jar first, or pass it explicitly with --input.".to_string())
      }
      ArchiveError::OutputIsInput { .. } => Some("Write the release jar to a different --output-dir.".to_string()),
      _ => None,
    }
  }
}

impl fmt::Display for ArchiveError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ArchiveError::DuplicateEntry { path } => write!(f, "Duplicate archive entry: {}", path),
      ArchiveError::NormalizationParse { path, reason } => {
        write!(f, "Failed to normalize {}: {}", path, reason)
      }
      ArchiveError::NoInputs => write!(f, "No input archives to assemble"),
      ArchiveError::InputNotFound { path } => {
        write!(f, "Input archive not found: {}", path.display())
      }
      ArchiveError::Zip { path, reason } => write!(f, "Archive error in {}: {}", path.display(), reason),
      ArchiveError::OutputIsInput { path } => {
        write!(f, "Output {} would overwrite one of the input archives", path.display())
      }
    }
  }
}

/// Release precondition failures
#[derive(Debug)]
pub enum GateError {
  /// Changelog missing or blank
  DocumentationMissing { path: PathBuf },

  /// Working tree is dirty
  UncommittedChanges { sample: String },

  /// Branch has diverged from its upstream
  UnpushedChanges { ahead: u64, behind: u64 },
}

impl GateError {
  fn help_message(&self) -> Option<String> {
    match self {
      GateError::DocumentationMissing { path } => Some(format!(
        "Describe this release in {} (set MOD_IGNORE_CHANGES=true to skip this check).",
        path.display()
      )),
      GateError::UncommittedChanges { .. } => Some("Commit or stash your changes before releasing.".to_string()),
      GateError::UnpushedChanges { .. } => Some("Push (or pull) so the branch matches its upstream.".to_string()),
    }
  }
}

impl fmt::Display for GateError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GateError::DocumentationMissing { path } => {
        write!(f, "Cannot release without release notes: {} is missing or empty", path.display())
      }
      GateError::UncommittedChanges { sample } => {
        write!(f, "Cannot release with uncommitted changes.\n{}", sample)
      }
      GateError::UnpushedChanges { ahead, behind } => write!(
        f,
        "Cannot release with un-pushed changes (ahead {}, behind {}).",
        ahead, behind
      ),
    }
  }
}

/// Source-control tool errors
#[derive(Debug)]
pub enum GitError {
  /// git could not be started
  ToolUnavailable { command: String, reason: String },

  /// git ran but exited abnormally
  CommandFailed { command: String, stderr: String },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::ToolUnavailable { .. } => Some("Make sure git is installed and on PATH.".to_string()),
      GitError::CommandFailed { stderr, .. } if stderr.contains("not a git repository") => {
        Some("Run modrelease inside the mod's git repository or pass --repo-root.".to_string())
      }
      GitError::CommandFailed { .. } => None,
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::ToolUnavailable { command, reason } => {
        write!(f, "Error occurred whilst running `{}`: {}", command, reason)
      }
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr.trim_end())
      }
    }
  }
}

/// Result type alias for modrelease
pub type ModResult<T> = Result<T, ModError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> ModResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<ModError>,
{
  fn with_context<F>(self, f: F) -> ModResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &ModError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}

impl From<anyhow::Error> for ModError {
  fn from(err: anyhow::Error) -> Self {
    ModError::message(format!("{:#}", err))
  }
}
