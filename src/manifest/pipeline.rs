//! Read, prefix and write back a bundler manifest in place.

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::config::ManifestOptions;
use crate::diagnostics::{DiagnosticSink, ERROR_PREFIX};
use crate::error::{RewriteError, RewriteResult};
use crate::manifest::resolve_manifest_path;
use crate::models::{Manifest, RewriteSummary};

/// Rewrite the manifest below `output_dir`, reporting any failure to `sink` instead of returning it.
///
/// The file is only written once the whole transform has succeeded, so a failure leaves the
/// original manifest untouched.
pub fn rewrite(output_dir: Option<&Path>, options: &ManifestOptions, sink: &dyn DiagnosticSink) {
  match try_rewrite(output_dir, options) {
    Ok(summary) => {
      tracing::info!(
        path = %summary.manifest_path.display(),
        entries = summary.entries,
        stylesheets = summary.stylesheets,
        public_path = options.base(),
        "rewrote manifest"
      );
    }
    Err(err) => sink.error(ERROR_PREFIX, &err),
  }
}

/// Fallible form of [`rewrite`].
pub fn try_rewrite(
  output_dir: Option<&Path>,
  options: &ManifestOptions,
) -> RewriteResult<RewriteSummary> {
  let manifest_path = resolve_manifest_path(output_dir, &options.file_name)?;
  tracing::debug!(path = %manifest_path.display(), "loading manifest");

  let manifest = load_manifest(&manifest_path)?;
  let rewritten = manifest.with_public_path(options.base());
  let rendered = render_manifest(&rewritten)?;
  store_manifest(&manifest_path, &rendered)?;

  Ok(RewriteSummary {
    entries: rewritten.len(),
    stylesheets: rewritten.stylesheet_count(),
    manifest_path,
  })
}

/// Load and parse a manifest from disk.
pub fn load_manifest(path: &Path) -> RewriteResult<Manifest> {
  let content = fs::read_to_string(path).map_err(|source| RewriteError::Read {
    path: path.to_path_buf(),
    source,
  })?;
  serde_json::from_str(&content).map_err(|source| RewriteError::Parse {
    path: path.to_path_buf(),
    source,
  })
}

/// Render a manifest as two-space indented JSON without a trailing newline.
pub fn render_manifest(manifest: &Manifest) -> RewriteResult<String> {
  serde_json::to_string_pretty(manifest).map_err(|source| RewriteError::Serialize { source })
}

/// Replace `path` with `contents`, flushed to disk before returning.
///
/// The contents go to a sibling temporary file that is renamed over the manifest, so a failed
/// write leaves the previous manifest intact. Permissions of the existing file are kept.
pub fn store_manifest(path: &Path, contents: &str) -> RewriteResult<()> {
  let write = || -> std::io::Result<()> {
    let dir = path
      .parent()
      .filter(|dir| !dir.as_os_str().is_empty())
      .unwrap_or_else(|| Path::new("."));
    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(contents.as_bytes())?;
    if let Ok(metadata) = fs::metadata(path) {
      staged.as_file().set_permissions(metadata.permissions())?;
    }
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|err| err.error)?;
    Ok(())
  };
  write().map_err(|source| RewriteError::Write {
    path: path.to_path_buf(),
    source,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::diagnostics::RecordingSink;
  use tempfile::tempdir;

  fn write_manifest(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
    path
  }

  #[test]
  fn rewrites_single_entry() {
    let dir = tempdir().unwrap();
    let path = write_manifest(dir.path(), "manifest.json", r#"{"main.js":{"file":"main.js"}}"#);
    let options = ManifestOptions::new("manifest.json").with_public_path("/assets/");

    let summary = try_rewrite(Some(dir.path()), &options).unwrap();

    assert_eq!(summary.entries, 1);
    assert_eq!(summary.stylesheets, 0);
    assert_eq!(
      fs::read_to_string(path).unwrap(),
      "{\n  \"main.js\": {\n    \"file\": \"/assets/main.js\"\n  }\n}"
    );
  }

  #[test]
  fn rewrites_nested_manifest_with_stylesheets() {
    let dir = tempdir().unwrap();
    let path = write_manifest(
      dir.path(),
      ".vite/manifest.json",
      r#"{"index.html":{"file":"index.html","css":["a.css","b.css"]}}"#,
    );
    let options = ManifestOptions::new(".vite/manifest.json").with_public_path("https://cdn.x/");

    let summary = try_rewrite(Some(dir.path()), &options).unwrap();

    assert_eq!(summary.stylesheets, 2);
    assert_eq!(summary.manifest_path, path);
    let expected = r#"{
  "index.html": {
    "file": "https://cdn.x/index.html",
    "css": [
      "https://cdn.x/a.css",
      "https://cdn.x/b.css"
    ]
  }
}"#;
    assert_eq!(fs::read_to_string(path).unwrap(), expected);
  }

  #[test]
  fn empty_manifest_stays_empty() {
    let dir = tempdir().unwrap();
    let path = write_manifest(dir.path(), "manifest.json", "{}");

    try_rewrite(Some(dir.path()), &ManifestOptions::new("manifest.json")).unwrap();

    assert_eq!(fs::read_to_string(path).unwrap(), "{}");
  }

  #[test]
  fn missing_manifest_is_reported_once() {
    let dir = tempdir().unwrap();
    let sink = RecordingSink::default();

    rewrite(Some(dir.path()), &ManifestOptions::new("manifest.json"), &sink);

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].message, "An error occurred:");
    assert_eq!(records[0].stage, "read");
    assert!(!dir.path().join("manifest.json").exists());
  }

  #[test]
  fn malformed_manifest_is_left_untouched() {
    let dir = tempdir().unwrap();
    let path = write_manifest(dir.path(), "manifest.json", "invalid json content");
    let sink = RecordingSink::default();

    rewrite(
      Some(dir.path()),
      &ManifestOptions::new("manifest.json").with_public_path("/static/"),
      &sink,
    );

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].stage, "parse");
    assert_eq!(fs::read_to_string(path).unwrap(), "invalid json content");
  }

  #[test]
  fn entry_without_file_is_a_parse_error() {
    let dir = tempdir().unwrap();
    let original = r#"{"main.js":{"css":["a.css"]}}"#;
    let path = write_manifest(dir.path(), "manifest.json", original);

    let err = try_rewrite(Some(dir.path()), &ManifestOptions::new("manifest.json")).unwrap_err();

    assert!(matches!(err, RewriteError::Parse { .. }));
    assert_eq!(fs::read_to_string(path).unwrap(), original);
  }

  #[test]
  fn successful_rewrite_reports_nothing() {
    let dir = tempdir().unwrap();
    write_manifest(dir.path(), "manifest.json", r#"{"main.js":{"file":"main.js"}}"#);
    let sink = RecordingSink::default();

    rewrite(Some(dir.path()), &ManifestOptions::new("manifest.json"), &sink);

    assert!(sink.records().is_empty());
  }

  #[test]
  fn store_manifest_reports_write_failures() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("missing-dir").join("manifest.json");

    let err = store_manifest(&target, "{}").unwrap_err();

    assert_eq!(err.stage(), "write");
  }

  #[test]
  fn store_manifest_replaces_contents_without_leftovers() {
    let dir = tempdir().unwrap();
    let path = write_manifest(dir.path(), "manifest.json", r#"{"main.js":{"file":"main.js"}}"#);

    store_manifest(&path, "{}").unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
  }

  #[cfg(unix)]
  #[test]
  fn store_manifest_keeps_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let path = write_manifest(dir.path(), "manifest.json", "{}");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

    store_manifest(&path, r#"{"a":{"file":"/a.js"}}"#).unwrap();

    let mode = fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o644);
  }

  #[cfg(unix)]
  #[test]
  fn write_failure_is_reported_once_and_keeps_manifest() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let out_dir = dir.path().join("dist");
    let original = r#"{"main.js":{"file":"main.js"}}"#;
    let path = write_manifest(&out_dir, "manifest.json", original);
    fs::set_permissions(&out_dir, fs::Permissions::from_mode(0o555)).unwrap();

    // Privileged users ignore directory permissions; nothing to observe then.
    if fs::write(out_dir.join(".permission-check"), b"").is_ok() {
      fs::set_permissions(&out_dir, fs::Permissions::from_mode(0o755)).unwrap();
      return;
    }

    let sink = RecordingSink::default();
    rewrite(Some(&out_dir), &ManifestOptions::new("manifest.json"), &sink);
    fs::set_permissions(&out_dir, fs::Permissions::from_mode(0o755)).unwrap();

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].message, "An error occurred:");
    assert_eq!(records[0].stage, "write");
    assert_eq!(fs::read_to_string(path).unwrap(), original);
    assert_eq!(fs::read_dir(&out_dir).unwrap().count(), 1);
  }
}
