//! Canonical JSON re-serialization for embedded resources
//!
//! Canonical form: object keys sorted, compact separators, no trailing newline.
//! Two inputs that parse to the same JSON value always produce the same bytes,
//! and canonical input comes back unchanged. Numbers are copied through exactly
//! as written, without a round trip through floating point.

use serde_json::{Map, Value};
use std::io::{Read, Write};

/// Streaming JSON normalizer
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonNormalizer;

impl JsonNormalizer {
  /// Read one JSON document from `reader` and write its canonical form to `writer`
  pub fn normalize<R: Read, W: Write>(&self, reader: R, mut writer: W) -> Result<(), NormalizeError> {
    let value: Value = serde_json::from_reader(reader).map_err(NormalizeError::Parse)?;
    serde_json::to_writer(&mut writer, &canonicalize(value)).map_err(NormalizeError::Write)?;
    writer.flush().map_err(NormalizeError::Io)?;
    Ok(())
  }

  /// Normalize an in-memory document
  pub fn normalize_bytes(&self, input: &[u8]) -> Result<Vec<u8>, NormalizeError> {
    let mut out = Vec::with_capacity(input.len());
    self.normalize(input, &mut out)?;
    Ok(out)
  }
}

/// Failure while normalizing one document
#[derive(Debug)]
pub enum NormalizeError {
  /// Input is not well-formed JSON
  Parse(serde_json::Error),
  /// Serialization failed
  Write(serde_json::Error),
  /// Flushing the sink failed
  Io(std::io::Error),
}

impl std::fmt::Display for NormalizeError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      NormalizeError::Parse(e) => write!(f, "invalid JSON: {}", e),
      NormalizeError::Write(e) => write!(f, "failed to write JSON: {}", e),
      NormalizeError::Io(e) => write!(f, "I/O error: {}", e),
    }
  }
}

/// Rebuild `value` with every object's keys in sorted order
///
/// Insertion happens in sorted order, so the result is sorted whether `Map`
/// is backed by a `BTreeMap` or by an insertion-ordered map.
fn canonicalize(value: Value) -> Value {
  match value {
    Value::Object(map) => {
      let mut entries: Vec<(String, Value)> = map.into_iter().collect();
      entries.sort_by(|a, b| a.0.cmp(&b.0));

      let mut sorted = Map::with_capacity(entries.len());
      for (key, child) in entries {
        sorted.insert(key, canonicalize(child));
      }
      Value::Object(sorted)
    }
    Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
    other => other,
  }
}
