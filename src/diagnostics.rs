//! Where rewrite failures go instead of propagating to the build tool.

use std::sync::{Mutex, PoisonError};

use crate::error::RewriteError;

/// Fixed prefix attached to every reported failure.
pub const ERROR_PREFIX: &str = "An error occurred:";

/// Receiver for failures contained by [`crate::manifest::rewrite`].
pub trait DiagnosticSink {
  /// Report a failure with a human readable `message` and the underlying error.
  fn error(&self, message: &str, error: &RewriteError);
}

/// Default sink forwarding failures to `tracing` at error level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
  fn error(&self, message: &str, error: &RewriteError) {
    tracing::error!(stage = error.stage(), error = %error, "{message}");
  }
}

/// A single failure captured by [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
  /// Message passed to the sink.
  pub message: String,
  /// Pipeline stage reported by [`RewriteError::stage`].
  pub stage: &'static str,
  /// Rendered error.
  pub detail: String,
}

/// Sink that keeps every report in memory, for hosts that surface failures themselves.
#[derive(Debug, Default)]
pub struct RecordingSink {
  records: Mutex<Vec<Diagnostic>>,
}

impl RecordingSink {
  /// Snapshot of the failures reported so far.
  pub fn records(&self) -> Vec<Diagnostic> {
    self
      .records
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .clone()
  }
}

impl DiagnosticSink for RecordingSink {
  fn error(&self, message: &str, error: &RewriteError) {
    self
      .records
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .push(Diagnostic {
        message: message.to_string(),
        stage: error.stage(),
        detail: error.to_string(),
      });
  }
}
