//! Publishing a finished jar to the mod registry
//!
//! The registry is an external collaborator: whatever it reports is passed
//! back verbatim and the local jar is never touched.

use super::manifest::ReleaseManifest;
use anyhow::{Context, bail};
use reqwest::blocking::Client;
use reqwest::blocking::multipart::{Form, Part};
use serde_json::{Value, json};
use std::fs;
use std::path::PathBuf;

/// Default registry endpoint
const DEFAULT_API_URL: &str = "https://api.modrinth.com";

/// Multipart name of the jar part
const PRIMARY_FILE_PART: &str = "file";

/// What gets published
#[derive(Debug, Clone)]
pub struct PublishRequest {
  pub artifact: PathBuf,
  pub manifest: ReleaseManifest,
  pub project_id: String,
}

/// Registry response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReceipt {
  /// Registry id of the created version (absent in debug mode)
  pub version_id: Option<String>,
  /// Nothing was uploaded
  pub debug: bool,
}

/// Uploads a release to a registry
pub trait Publisher {
  fn publish(&self, request: &PublishRequest) -> anyhow::Result<PublishReceipt>;
}

/// Modrinth `POST /v2/version` client
#[derive(Debug, Clone)]
pub struct ModrinthPublisher {
  base_url: String,
  token: Option<String>,
  debug: bool,
}

impl ModrinthPublisher {
  pub const TOKEN_VAR: &'static str = "MODRINTH_TOKEN";
  pub const API_URL_VAR: &'static str = "MODRINTH_API_URL";

  /// Configure from `MODRINTH_TOKEN` and `MODRINTH_API_URL`
  pub fn from_env(debug: bool) -> Self {
    let base_url = std::env::var(Self::API_URL_VAR).unwrap_or_else(|_| DEFAULT_API_URL.to_string());
    let token = std::env::var(Self::TOKEN_VAR).ok().filter(|t| !t.trim().is_empty());
    Self::new(base_url, token, debug)
  }

  pub fn new(base_url: impl Into<String>, token: Option<String>, debug: bool) -> Self {
    Self {
      base_url: base_url.into().trim_end_matches('/').to_string(),
      token,
      debug,
    }
  }

  fn endpoint(&self) -> String {
    format!("{}/v2/version", self.base_url)
  }
}

/// JSON `data` part of the version upload
pub fn version_payload(request: &PublishRequest) -> Value {
  let manifest = &request.manifest;
  json!({
    "name": manifest.version_number,
    "version_number": manifest.version_number,
    "changelog": manifest.changelog_text,
    "dependencies": [],
    "game_versions": manifest.target_runtime_versions,
    "version_type": manifest.version_channel.as_str(),
    "loaders": manifest.loaders,
    "featured": false,
    "project_id": request.project_id,
    "file_parts": [PRIMARY_FILE_PART],
    "primary_file": PRIMARY_FILE_PART,
  })
}

impl Publisher for ModrinthPublisher {
  fn publish(&self, request: &PublishRequest) -> anyhow::Result<PublishReceipt> {
    let payload = version_payload(request);

    if self.debug {
      log::info!("debug upload to {}: {}", self.endpoint(), payload);
      println!("🐞 Debug mode: {} not uploaded", request.artifact.display());
      println!("{}", serde_json::to_string_pretty(&payload)?);
      return Ok(PublishReceipt {
        version_id: None,
        debug: true,
      });
    }

    let Some(token) = self.token.as_deref() else {
      bail!("{} is not set", Self::TOKEN_VAR);
    };

    let jar = fs::read(&request.artifact).with_context(|| format!("Failed to read {}", request.artifact.display()))?;
    let file_name = request
      .artifact
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_else(|| "release.jar".to_string());
    let jar_part = Part::bytes(jar).file_name(file_name).mime_str("application/java-archive")?;
    let form = Form::new()
      .text("data", payload.to_string())
      .part(PRIMARY_FILE_PART, jar_part);

    let client = Client::builder()
      .user_agent(concat!("modrelease/", env!("CARGO_PKG_VERSION")))
      .build()?;

    log::info!("uploading {} to {}", request.artifact.display(), self.endpoint());
    let response = client
      .post(self.endpoint())
      .header(reqwest::header::AUTHORIZATION, token)
      .multipart(form)
      .send()
      .with_context(|| format!("Failed to reach {}", self.base_url))?;

    let status = response.status();
    let body = response.text().unwrap_or_default();
    if !status.is_success() {
      bail!("registry rejected upload ({}): {}", status, body);
    }

    let version_id = serde_json::from_str::<Value>(&body)
      .ok()
      .and_then(|v| v.get("id").and_then(Value::as_str).map(str::to_string));
    Ok(PublishReceipt {
      version_id,
      debug: false,
    })
  }
}
