//! Module configuration: property sources, typed module settings, overrides
//!
//! Properties are gathered once, layered in a fixed order, and validated into
//! `ModuleConfig` before any build step runs. Nothing downstream looks up a
//! property by name again.
//!
//! Layering (later wins):
//! 1. `<repo-root>/gradle.properties`
//! 2. `<module-dir>/gradle.properties`
//! 3. `<module-dir>/modrelease.toml`
//! 4. `-P key=value` from the command line

use crate::core::error::{ConfigError, ModResult, ResultExt};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Property keys understood by modrelease
pub mod keys {
  pub const MOD_ID: &str = "mod_id";
  pub const MOD_VERSION: &str = "mod_version";
  pub const PLATFORM: &str = "template.platform";
  pub const MINECRAFT_VERSION: &str = "minecraft_version";
  pub const PARCHMENT_VERSION: &str = "parchment_version";
  pub const ARCHIVES_BASE_NAME: &str = "archives_base_name";
  pub const USES_DATAGEN: &str = "template.usesDataGen";
  pub const PRODUCES_RELEASE_ARTIFACT: &str = "template.producesReleaseArtifact";
  pub const REPOSITORY_URL: &str = "template.repositoryUrl";
  pub const EXTRA_GAME_VERSIONS: &str = "template.extraGameVersions";
  pub const MODRINTH_PROJECT_ID: &str = "modrinth_project_id";
}

pub const PROPERTIES_FILE: &str = "gradle.properties";
pub const TOML_FILE: &str = "modrelease.toml";

/// A single property value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
  Text(String),
  Flag(bool),
}

/// Immutable string-keyed property bag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertySource {
  values: BTreeMap<String, PropertyValue>,
}

impl PropertySource {
  /// Build a source from textual key/value pairs
  pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
  where
    K: Into<String>,
    V: Into<String>,
  {
    Self {
      values: pairs
        .into_iter()
        .map(|(k, v)| (k.into(), PropertyValue::Text(v.into())))
        .collect(),
    }
  }

  /// Parse Java `.properties` content
  ///
  /// Follows `java.util.Properties.load`: `#`/`!` comment lines, backslash line
  /// continuations, keys ending at the first unescaped `=`, `:` or whitespace,
  /// and `\t \n \r \f \uXXXX` escapes. Trailing whitespace in values is kept.
  pub fn parse_properties(content: &str, origin: &Path) -> Result<Self, ConfigError> {
    let mut values = BTreeMap::new();

    for line in logical_lines(content) {
      let (raw_key, raw_value) = split_property(&line);
      let parse_error = |reason: String| ConfigError::Parse {
        path: origin.to_path_buf(),
        reason,
      };
      let key = unescape_property(raw_key).map_err(parse_error)?;
      let value = unescape_property(raw_value).map_err(parse_error)?;
      values.insert(key, PropertyValue::Text(value));
    }

    Ok(Self { values })
  }

  /// Parse a `modrelease.toml` document, flattening nested tables into dotted keys
  pub fn parse_toml(content: &str, origin: &Path) -> Result<Self, ConfigError> {
    let doc: toml_edit::DocumentMut = content.parse().map_err(|e: toml_edit::TomlError| ConfigError::Parse {
      path: origin.to_path_buf(),
      reason: e.to_string(),
    })?;

    let mut values = BTreeMap::new();
    flatten_table(doc.as_table().iter(), "", &mut values);
    Ok(Self { values })
  }

  /// Load a `.properties` file if it exists
  pub fn load_properties_file(path: &Path) -> ModResult<Option<Self>> {
    if !path.is_file() {
      return Ok(None);
    }
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(Some(Self::parse_properties(&content, path)?))
  }

  /// Load a `modrelease.toml` file if it exists
  pub fn load_toml_file(path: &Path) -> ModResult<Option<Self>> {
    if !path.is_file() {
      return Ok(None);
    }
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(Some(Self::parse_toml(&content, path)?))
  }

  /// Load every layer for a module and apply command-line overrides
  pub fn load_layered(repo_root: &Path, module_dir: &Path, overrides: &[(String, String)]) -> ModResult<Self> {
    let mut layers = Vec::new();

    let root_props = repo_root.join(PROPERTIES_FILE);
    let module_props = module_dir.join(PROPERTIES_FILE);

    if let Some(root) = Self::load_properties_file(&root_props)? {
      log::debug!("loaded {}", root_props.display());
      layers.push(root);
    }
    if module_props != root_props
      && let Some(module) = Self::load_properties_file(&module_props)?
    {
      log::debug!("loaded {}", module_props.display());
      layers.push(module);
    }
    if let Some(toml) = Self::load_toml_file(&module_dir.join(TOML_FILE))? {
      log::debug!("loaded {}", module_dir.join(TOML_FILE).display());
      layers.push(toml);
    }
    if layers.is_empty() {
      return Err(ConfigError::PropertiesNotFound { path: module_props }.into());
    }
    layers.push(Self::from_pairs(overrides.iter().cloned()));

    Ok(Self::layered(layers))
  }

  /// Merge sources; later sources override earlier ones key by key
  pub fn layered(sources: impl IntoIterator<Item = PropertySource>) -> Self {
    let mut values = BTreeMap::new();
    for source in sources {
      values.extend(source.values);
    }
    Self { values }
  }

  /// Raw value lookup
  pub fn get(&self, key: &str) -> Option<&PropertyValue> {
    self.values.get(key)
  }

  /// Textual value, if present and not a boolean
  pub fn text(&self, key: &str) -> Option<&str> {
    match self.get(key) {
      Some(PropertyValue::Text(s)) => Some(s.as_str()),
      _ => None,
    }
  }

  /// Optional textual value; blank counts as absent
  pub fn optional_text(&self, key: &str) -> Option<String> {
    self.text(key).map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
  }

  /// Required, non-blank textual value
  pub fn require_text(&self, key: &str) -> Result<String, ConfigError> {
    match self.values.get(key) {
      Some(PropertyValue::Text(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
      Some(PropertyValue::Flag(b)) => Err(ConfigError::InvalidValue {
        key: key.to_string(),
        value: b.to_string(),
        reason: "expected a string, found a boolean".to_string(),
      }),
      _ => Err(ConfigError::MissingKey { key: key.to_string() }),
    }
  }

  /// Permissive boolean: only `true` (or the literal string "true") is true
  pub fn flag(&self, key: &str) -> bool {
    match self.get(key) {
      Some(PropertyValue::Flag(b)) => *b,
      Some(PropertyValue::Text(s)) => s == "true",
      None => false,
    }
  }

  /// Number of distinct keys
  pub fn key_count(&self) -> usize {
    self.values.len()
  }
}

fn is_property_space(c: char) -> bool {
  matches!(c, ' ' | '\t' | '\u{c}')
}

/// Odd number of trailing backslashes
fn continues_on_next_line(line: &str) -> bool {
  line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Join continued lines and drop blank and comment lines
fn logical_lines(content: &str) -> Vec<String> {
  let normalized = content.replace("\r\n", "\n");
  let mut lines = Vec::new();
  let mut pending: Option<String> = None;

  for natural in normalized.split(['\n', '\r']) {
    let trimmed = natural.trim_start_matches(is_property_space);
    let mut logical = match pending.take() {
      Some(partial) => partial,
      None if trimmed.is_empty() || trimmed.starts_with(['#', '!']) => continue,
      None => String::new(),
    };

    if continues_on_next_line(trimmed) {
      logical.push_str(&trimmed[..trimmed.len() - 1]);
      pending = Some(logical);
    } else {
      logical.push_str(trimmed);
      lines.push(logical);
    }
  }
  lines.extend(pending);
  lines
}

/// Split a logical line into its raw (still escaped) key and value
fn split_property(line: &str) -> (&str, &str) {
  let mut key_end = line.len();
  let mut value_start = line.len();
  let mut has_separator = false;
  let mut escaped = false;

  for (idx, c) in line.char_indices() {
    if !escaped && (c == '=' || c == ':') {
      key_end = idx;
      value_start = idx + 1;
      has_separator = true;
      break;
    }
    if !escaped && is_property_space(c) {
      key_end = idx;
      value_start = idx + c.len_utf8();
      break;
    }
    escaped = c == '\\' && !escaped;
  }

  let mut value = line[value_start..].trim_start_matches(is_property_space);
  if !has_separator && let Some(rest) = value.strip_prefix(['=', ':']) {
    value = rest.trim_start_matches(is_property_space);
  }
  (&line[..key_end], value)
}

fn read_utf16_unit(chars: &mut std::str::Chars<'_>) -> Result<u16, String> {
  let digits: String = chars.by_ref().take(4).collect();
  if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
    return Err(format!("malformed \\uxxxx escape '\\u{}'", digits));
  }
  u16::from_str_radix(&digits, 16).map_err(|e| e.to_string())
}

fn unescape_property(raw: &str) -> Result<String, String> {
  let mut out = String::with_capacity(raw.len());
  let mut chars = raw.chars();

  while let Some(c) = chars.next() {
    if c != '\\' {
      out.push(c);
      continue;
    }
    match chars.next() {
      Some('t') => out.push('\t'),
      Some('n') => out.push('\n'),
      Some('r') => out.push('\r'),
      Some('f') => out.push('\u{c}'),
      Some('u') => {
        let unit = read_utf16_unit(&mut chars)?;
        let decoded = if (0xD800..0xDC00).contains(&unit) {
          // High surrogate: the low half must follow as another escape
          match chars.as_str().strip_prefix("\\u") {
            Some(rest) => {
              chars = rest.chars();
              let low = read_utf16_unit(&mut chars)?;
              char::decode_utf16([unit, low]).next().and_then(Result::ok)
            }
            None => None,
          }
        } else {
          char::from_u32(u32::from(unit))
        };
        out.push(decoded.unwrap_or(char::REPLACEMENT_CHARACTER));
      }
      Some(other) => out.push(other),
      None => {}
    }
  }
  Ok(out)
}

fn flatten_table<'a>(
  items: impl Iterator<Item = (&'a str, &'a toml_edit::Item)>,
  prefix: &str,
  out: &mut BTreeMap<String, PropertyValue>,
) {
  for (key, item) in items {
    let full_key = if prefix.is_empty() {
      key.to_string()
    } else {
      format!("{}.{}", prefix, key)
    };

    match item {
      toml_edit::Item::Value(value) => flatten_value(value, &full_key, out),
      toml_edit::Item::Table(table) => flatten_table(table.iter(), &full_key, out),
      toml_edit::Item::ArrayOfTables(_) | toml_edit::Item::None => {
        log::warn!("ignoring unsupported TOML entry '{}'", full_key);
      }
    }
  }
}

fn flatten_value(value: &toml_edit::Value, key: &str, out: &mut BTreeMap<String, PropertyValue>) {
  use toml_edit::Value;

  match value {
    Value::String(s) => {
      out.insert(key.to_string(), PropertyValue::Text(s.value().clone()));
    }
    Value::Boolean(b) => {
      out.insert(key.to_string(), PropertyValue::Flag(*b.value()));
    }
    Value::Integer(i) => {
      out.insert(key.to_string(), PropertyValue::Text(i.value().to_string()));
    }
    Value::Float(f) => {
      out.insert(key.to_string(), PropertyValue::Text(f.value().to_string()));
    }
    Value::Datetime(d) => {
      out.insert(key.to_string(), PropertyValue::Text(d.value().to_string()));
    }
    Value::Array(array) => {
      // Arrays become the comma-separated form used by list-valued properties
      let joined = array
        .iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect::<Vec<_>>()
        .join(",");
      out.insert(key.to_string(), PropertyValue::Text(joined));
    }
    Value::InlineTable(table) => {
      for (sub_key, sub_value) in table.iter() {
        flatten_value(sub_value, &format!("{}.{}", key, sub_key), out);
      }
    }
  }
}

/// Parse a `key=value` command-line override
pub fn parse_override(raw: &str) -> Result<(String, String), String> {
  let (key, value) = raw
    .split_once('=')
    .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
  let key = key.trim();
  if key.is_empty() {
    return Err(format!("empty property name in '{}'", raw));
  }
  Ok((key.to_string(), value.trim().to_string()))
}

/// Target platform (loader ecosystem) a module is packaged for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
  Fabric,
  NeoForge,
}

impl Platform {
  pub const ALL: [Platform; 2] = [Platform::Fabric, Platform::NeoForge];

  /// Identifier used in properties and registry loader tags
  pub fn id(self) -> &'static str {
    match self {
      Platform::Fabric => "fabric",
      Platform::NeoForge => "neoforge",
    }
  }

  /// Classifier of the final release jar
  pub fn classifier(self) -> &'static str {
    self.id()
  }

  /// Classifier of the jar produced by the upstream remap step
  pub fn intermediate_classifier(self) -> &'static str {
    match self {
      Platform::Fabric => "fat",
      Platform::NeoForge => "fat",
    }
  }

  /// Loader tags attached to a published version
  pub fn loaders(self) -> Vec<String> {
    vec![self.id().to_string()]
  }
}

impl fmt::Display for Platform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.id())
  }
}

impl FromStr for Platform {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Platform::ALL
      .into_iter()
      .find(|p| p.id() == s.trim())
      .ok_or_else(|| ConfigError::UnsupportedPlatform { value: s.to_string() })
  }
}

/// Validated per-module build configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleConfig {
  pub module_id: String,
  pub module_version: String,
  pub platform: Platform,
  pub produces_release_artifact: bool,
  pub uses_data_generation: bool,
  pub target_runtime_version: String,
  pub mapping_refinement_version: Option<String>,
  pub archives_base_name: Option<String>,
}

impl ModuleConfig {
  /// Validate a property source into a module configuration
  ///
  /// Required keys are checked in a fixed order so the first missing one is
  /// always the one reported.
  pub fn from_properties(props: &PropertySource) -> Result<Self, ConfigError> {
    let module_id = props.require_text(keys::MOD_ID)?;
    let module_version = props.require_text(keys::MOD_VERSION)?;
    let platform: Platform = props.require_text(keys::PLATFORM)?.parse()?;
    let target_runtime_version = props.require_text(keys::MINECRAFT_VERSION)?;

    if semver::Version::parse(&module_version).is_err() {
      log::warn!(
        "mod_version '{}' is not a semantic version; continuing anyway",
        module_version
      );
    }

    Ok(Self {
      module_id,
      module_version,
      platform,
      produces_release_artifact: props.flag(keys::PRODUCES_RELEASE_ARTIFACT),
      uses_data_generation: props.flag(keys::USES_DATAGEN),
      target_runtime_version,
      mapping_refinement_version: props.optional_text(keys::PARCHMENT_VERSION),
      archives_base_name: props.optional_text(keys::ARCHIVES_BASE_NAME),
    })
  }

  /// Base name for generated jar files
  pub fn archive_base_name(&self) -> &str {
    self.archives_base_name.as_deref().unwrap_or(&self.module_id)
  }
}

/// Settings only the release path needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSettings {
  /// Web URL of the source repository, without trailing slash
  pub repository_url: String,
  /// Registry project the version is published to
  pub project_id: String,
  /// Comma-separated extra runtime versions, as configured
  pub extra_versions: Option<String>,
}

impl ReleaseSettings {
  pub fn from_properties(props: &PropertySource) -> Result<Self, ConfigError> {
    let repository_url = props.require_text(keys::REPOSITORY_URL)?.trim_end_matches('/').to_string();
    let project_id = props.require_text(keys::MODRINTH_PROJECT_ID)?;

    Ok(Self {
      repository_url,
      project_id,
      extra_versions: props.optional_text(keys::EXTRA_GAME_VERSIONS),
    })
  }
}

/// Process-level override flags, read once at startup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overrides {
  /// Skip the release gate checks (`MOD_IGNORE_CHANGES`)
  pub ignore_changes: bool,
  /// Publisher debug mode, no network upload (`MOD_UPLOAD_DEBUG`)
  pub upload_debug: bool,
}

impl Overrides {
  pub const IGNORE_CHANGES_VAR: &'static str = "MOD_IGNORE_CHANGES";
  pub const UPLOAD_DEBUG_VAR: &'static str = "MOD_UPLOAD_DEBUG";

  pub fn from_env() -> Self {
    Self::from_lookup(|name| std::env::var(name).ok())
  }

  /// Resolve overrides from an arbitrary variable lookup
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
    Self {
      ignore_changes: lookup(Self::IGNORE_CHANGES_VAR).is_some_and(|v| v != "false"),
      upload_debug: lookup(Self::UPLOAD_DEBUG_VAR).is_some_and(|v| v == "true"),
    }
  }
}
