//! Manifest rewriting split into path handling and the read-transform-write pipeline.

mod paths;
mod pipeline;

pub use paths::{prefix_path, resolve_manifest_path};
pub use pipeline::{load_manifest, render_manifest, rewrite, store_manifest, try_rewrite};
