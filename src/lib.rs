#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod models;
pub mod plugin;

pub use config::ManifestOptions;
pub use diagnostics::{DiagnosticSink, RecordingSink, TracingSink};
pub use error::{RewriteError, RewriteResult};
pub use manifest::{rewrite, try_rewrite};
pub use models::{Manifest, ManifestEntry, RewriteSummary, Stylesheets};
pub use plugin::{BundleOutput, ManifestPlugin};
