//! Rewrite configuration: which manifest to touch and which prefix to apply.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// File name probed by [`ManifestOptions::discover`].
pub const DEFAULT_CONFIG_FILE: &str = "manifest-rewrite.config.json";

/// Prefix used when no public path is configured.
pub const DEFAULT_PUBLIC_PATH: &str = "/";

/// Options handed to the rewriter when the build hook is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestOptions {
  /// Manifest path relative to the bundle output directory.
  pub file_name: String,
  /// Prefix prepended to every rewritten path. An empty string is a real value.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub public_path: Option<String>,
}

impl ManifestOptions {
  /// Options for `file_name` with no public path configured.
  pub fn new(file_name: impl Into<String>) -> Self {
    Self {
      file_name: file_name.into(),
      public_path: None,
    }
  }

  /// Set the public path prefix.
  pub fn with_public_path(mut self, public_path: impl Into<String>) -> Self {
    self.public_path = Some(public_path.into());
    self
  }

  /// Effective base prefix, falling back to `/` only when nothing is configured.
  pub fn base(&self) -> &str {
    self.public_path.as_deref().unwrap_or(DEFAULT_PUBLIC_PATH)
  }

  /// Read options from a JSON file shaped like `{"fileName": "...", "publicPath": "..."}`.
  pub fn from_path(path: &Path) -> Result<Self> {
    let content = fs::read_to_string(path)
      .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&content)
      .with_context(|| format!("failed to parse config {}", path.display()))
  }

  /// Look for [`DEFAULT_CONFIG_FILE`] in `dir`.
  ///
  /// A missing file yields `Ok(None)`; a present but broken file is an error so a typo in the
  /// config never silently falls back to defaults.
  pub fn discover(dir: &Path) -> Result<Option<Self>> {
    let candidate = Self::config_path(dir);
    if !candidate.is_file() {
      return Ok(None);
    }
    Self::from_path(&candidate).map(Some)
  }

  /// Location [`ManifestOptions::discover`] probes inside `dir`.
  pub fn config_path(dir: &Path) -> PathBuf {
    dir.join(DEFAULT_CONFIG_FILE)
  }
}
