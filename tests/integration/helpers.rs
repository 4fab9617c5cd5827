//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub const REPOSITORY_URL: &str = "https://github.com/example/sample";

/// A git repository holding a multi-platform mod
pub struct TestRepo {
  _root: TempDir,
  pub path: PathBuf,
}

impl TestRepo {
  /// Create a repository with shared root properties and one commit
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();

    git(&path, &["init", "--initial-branch=main"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;

    std::fs::write(path.join(".gitignore"), "build/\n")?;
    std::fs::write(
      path.join("gradle.properties"),
      format!(
        "# shared\nmod_id=sample\nmod_version=2.1.0\nminecraft_version=1.20.1\n\
         template.repositoryUrl={}\nmodrinth_project_id=AbCdEf12\n",
        REPOSITORY_URL
      ),
    )?;

    git(&path, &["add", "."])?;
    git(&path, &["commit", "-m", "Initial setup"])?;

    Ok(Self { _root: root, path })
  }

  /// Add a platform module directory; `extra` lines go into its gradle.properties
  pub fn add_module(&self, platform: &str, extra: &[(&str, &str)]) -> Result<PathBuf> {
    let module = self.path.join(platform);
    std::fs::create_dir_all(&module)?;

    let mut props = format!("template.platform={}\ntemplate.producesReleaseArtifact=true\n", platform);
    for (key, value) in extra {
      props.push_str(&format!("{}={}\n", key, value));
    }
    std::fs::write(module.join("gradle.properties"), props)?;
    Ok(module)
  }

  pub fn write_changelog(&self, content: &str) -> Result<()> {
    self.write_file("changelog.md", content)
  }

  pub fn write_file(&self, path: &str, content: &str) -> Result<()> {
    let file = self.path.join(path);
    if let Some(parent) = file.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file, content)?;
    Ok(())
  }

  pub fn remove_file(&self, path: &str) -> Result<()> {
    std::fs::remove_file(self.path.join(path))?;
    Ok(())
  }

  /// Write a jar with the given text entries
  pub fn write_jar(&self, path: &str, entries: &[(&str, &str)]) -> Result<PathBuf> {
    let jar = self.path.join(path);
    if let Some(parent) = jar.parent() {
      std::fs::create_dir_all(parent)?;
    }
    let mut writer = ZipWriter::new(std::fs::File::create(&jar)?);
    for (name, content) in entries {
      writer.start_file(*name, SimpleFileOptions::default())?;
      writer.write_all(content.as_bytes())?;
    }
    writer.finish()?;
    Ok(jar)
  }

  /// Commit current changes
  pub fn commit(&self, message: &str) -> Result<String> {
    git(&self.path, &["add", "."])?;
    git(&self.path, &["commit", "-m", message])?;
    self.head()
  }

  pub fn head(&self) -> Result<String> {
    let output = git(&self.path, &["rev-parse", "HEAD"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Push `main` to a fresh bare repository and track it
  pub fn add_upstream(&self) -> Result<TempDir> {
    let remote = TempDir::new()?;
    git(remote.path(), &["init", "--bare", "--initial-branch=main"])?;
    let remote_path = remote.path().to_string_lossy().to_string();
    git(&self.path, &["remote", "add", "origin", &remote_path])?;
    git(&self.path, &["push", "-u", "origin", "main"])?;
    Ok(remote)
  }
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

fn modrelease(cwd: &Path, args: &[&str], env: &[(&str, &str)]) -> Result<Output> {
  let mut cmd = Command::new(env!("CARGO_BIN_EXE_modrelease"));
  cmd
    .current_dir(cwd)
    .args(args)
    .env_remove("MOD_IGNORE_CHANGES")
    .env_remove("MOD_UPLOAD_DEBUG")
    .env_remove("MODRINTH_TOKEN")
    .env_remove("MODRINTH_API_URL")
    .env_remove("RUST_LOG");
  for (key, value) in env {
    cmd.env(key, value);
  }
  cmd.output().context("Failed to run modrelease")
}

/// Run modrelease, failing the test if it exits non-zero
pub fn run_modrelease(cwd: &Path, args: &[&str]) -> Result<Output> {
  run_modrelease_with_env(cwd, args, &[])
}

pub fn run_modrelease_with_env(cwd: &Path, args: &[&str], env: &[(&str, &str)]) -> Result<Output> {
  let output = modrelease(cwd, args, env)?;
  if !output.status.success() {
    anyhow::bail!(
      "modrelease command failed: modrelease {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      String::from_utf8_lossy(&output.stdout),
      String::from_utf8_lossy(&output.stderr)
    );
  }
  Ok(output)
}

/// Run modrelease, failing the test if it succeeds
pub fn run_modrelease_failing(cwd: &Path, args: &[&str], env: &[(&str, &str)]) -> Result<Output> {
  let output = modrelease(cwd, args, env)?;
  if output.status.success() {
    anyhow::bail!(
      "modrelease {} unexpectedly succeeded\nstdout: {}",
      args.join(" "),
      String::from_utf8_lossy(&output.stdout)
    );
  }
  Ok(output)
}

/// Entry names and contents of a jar, in archive order
pub fn read_jar(path: &Path) -> Result<Vec<(String, String)>> {
  let mut archive = zip::ZipArchive::new(std::fs::File::open(path)?)?;
  let mut entries = Vec::new();
  for i in 0..archive.len() {
    let mut entry = archive.by_index(i)?;
    let mut content = String::new();
    entry.read_to_string(&mut content)?;
    entries.push((entry.name().to_string(), content));
  }
  Ok(entries)
}

/// A registry stand-in that answers exactly one request
pub struct OneShotRegistry {
  pub base_url: String,
  handle: std::thread::JoinHandle<Result<String>>,
}

impl OneShotRegistry {
  pub fn start(status: &'static str, body: &'static str) -> Result<Self> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let base_url = format!("http://{}", listener.local_addr()?);

    let handle = std::thread::spawn(move || -> Result<String> {
      let (mut stream, _) = listener.accept()?;
      stream.set_read_timeout(Some(std::time::Duration::from_secs(30)))?;

      let mut raw = Vec::new();
      let mut buf = [0u8; 8192];
      while !http_request_complete(&raw) {
        let n = stream.read(&mut buf)?;
        if n == 0 {
          break;
        }
        raw.extend_from_slice(&buf[..n]);
      }

      write!(
        stream,
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
      )?;
      Ok(String::from_utf8_lossy(&raw).into_owned())
    });

    Ok(Self { base_url, handle })
  }

  /// Raw request text the registry received
  pub fn received(self) -> Result<String> {
    self
      .handle
      .join()
      .map_err(|_| anyhow::anyhow!("registry thread panicked"))?
  }
}

fn http_request_complete(raw: &[u8]) -> bool {
  let Some(header_end) = raw.windows(4).position(|w| w == b"\r\n\r\n") else {
    return false;
  };
  let headers = String::from_utf8_lossy(&raw[..header_end]).to_ascii_lowercase();
  if headers.contains("transfer-encoding: chunked") {
    return raw.ends_with(b"\r\n0\r\n\r\n");
  }
  let body_len = raw.len() - (header_end + 4);
  headers
    .lines()
    .find_map(|line| line.strip_prefix("content-length:"))
    .and_then(|value| value.trim().parse::<usize>().ok())
    .is_some_and(|expected| body_len >= expected)
}
