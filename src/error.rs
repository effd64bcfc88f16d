//! Failure modes of a single manifest rewrite.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used by the fallible rewrite pipeline.
pub type RewriteResult<T> = Result<T, RewriteError>;

/// Errors raised while resolving, reading, transforming or writing a manifest.
#[derive(Debug, Error)]
pub enum RewriteError {
  /// The manifest location could not be turned into an absolute path.
  #[error("failed to resolve manifest path {}: {source}", path.display())]
  Resolve {
    /// Joined, still relative, manifest path.
    path: PathBuf,
    /// Source I/O error from querying the working directory.
    source: std::io::Error,
  },
  /// The manifest file could not be read.
  #[error("failed to read manifest {}: {source}", path.display())]
  Read {
    /// Absolute manifest path.
    path: PathBuf,
    /// Source I/O error.
    source: std::io::Error,
  },
  /// The manifest contents are not a JSON object of manifest entries.
  #[error("failed to parse manifest {}: {source}", path.display())]
  Parse {
    /// Absolute manifest path.
    path: PathBuf,
    /// Source JSON error.
    source: serde_json::Error,
  },
  /// The rewritten manifest could not be encoded.
  #[error("failed to serialise rewritten manifest: {source}")]
  Serialize {
    /// Source JSON error.
    source: serde_json::Error,
  },
  /// The rewritten manifest could not be written back.
  #[error("failed to write manifest {}: {source}", path.display())]
  Write {
    /// Absolute manifest path.
    path: PathBuf,
    /// Source I/O error.
    source: std::io::Error,
  },
}

impl RewriteError {
  /// Short machine-friendly label for the failing pipeline stage.
  pub fn stage(&self) -> &'static str {
    match self {
      Self::Resolve { .. } => "resolve",
      Self::Read { .. } => "read",
      Self::Parse { .. } => "parse",
      Self::Serialize { .. } => "serialize",
      Self::Write { .. } => "write",
    }
  }
}
