//! Build-tool hook that rewrites the manifest once the bundle is on disk.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::ManifestOptions;
use crate::diagnostics::{DiagnosticSink, TracingSink};
use crate::manifest::rewrite;

/// Name the hook registers under.
pub const PLUGIN_NAME: &str = "vite-manifest-plugin";

/// Ordering of a hook relative to the host's own plugins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enforce {
  /// Run before core plugins.
  Pre,
  /// Run after core plugins.
  Post,
}

/// Host command a hook participates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyMode {
  /// Development server only.
  Serve,
  /// Production builds only.
  Build,
}

/// Output information the host passes once every bundle file is written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleOutput {
  /// Directory the bundle was written to, when the host knows it.
  pub dir: Option<PathBuf>,
}

impl BundleOutput {
  /// Output written below `dir`.
  pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
    Self {
      dir: Some(dir.into()),
    }
  }
}

/// Post-build hook prefixing manifest paths with the configured public path.
pub struct ManifestPlugin {
  options: ManifestOptions,
  sink: Arc<dyn DiagnosticSink + Send + Sync>,
}

impl ManifestPlugin {
  /// Create the hook; `options` stay fixed for the lifetime of the build.
  pub fn new(options: ManifestOptions) -> Self {
    Self {
      options,
      sink: Arc::new(TracingSink),
    }
  }

  /// Replace the default tracing sink.
  pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink + Send + Sync>) -> Self {
    self.sink = sink;
    self
  }

  /// Registered hook name.
  pub fn name(&self) -> &'static str {
    PLUGIN_NAME
  }

  /// The hook always runs after the host's own plugins.
  pub fn enforce(&self) -> Enforce {
    Enforce::Post
  }

  /// The hook only participates in production builds.
  pub fn apply(&self) -> ApplyMode {
    ApplyMode::Build
  }

  /// Options the hook was constructed with.
  pub fn options(&self) -> &ManifestOptions {
    &self.options
  }

  /// Called by the host after the bundle is written. Never fails.
  pub fn write_bundle(&self, output: &BundleOutput) {
    rewrite(output.dir.as_deref(), &self.options, self.sink.as_ref());
  }
}

impl std::fmt::Debug for ManifestPlugin {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ManifestPlugin")
      .field("options", &self.options)
      .finish_non_exhaustive()
  }
}
