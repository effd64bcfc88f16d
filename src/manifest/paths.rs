//! Path helpers: locating the manifest on disk and prefixing recorded asset paths.

use std::env;
use std::path::{Component, MAIN_SEPARATOR_STR, Path, PathBuf};

use crate::error::{RewriteError, RewriteResult};

/// Prefix `raw` with `base`, inserting a `/` only when `base` does not already end with one.
///
/// The rule is applied verbatim, so an empty `base` produces `/raw`.
pub fn prefix_path(base: &str, raw: &str) -> String {
  let separator = if base.ends_with('/') { "" } else { "/" };
  format!("{base}{separator}{raw}")
}

/// Compute the absolute manifest location for a bundle output directory.
///
/// The path is `output_dir/file_name`, with `file_name` always relative to the directory. A
/// missing output directory counts as empty, which roots the manifest at `/`. A relative result is
/// resolved against the current working directory and `.`/`..` segments are folded lexically.
pub fn resolve_manifest_path(output_dir: Option<&Path>, file_name: &str) -> RewriteResult<PathBuf> {
  let relative = strip_root(Path::new(file_name));
  let joined = match output_dir {
    Some(dir) => dir.join(relative),
    None => Path::new(MAIN_SEPARATOR_STR).join(relative),
  };

  let absolute = if joined.is_absolute() {
    joined
  } else {
    let cwd = env::current_dir().map_err(|source| RewriteError::Resolve {
      path: joined.clone(),
      source,
    })?;
    cwd.join(joined)
  };

  Ok(normalise_lexically(&absolute))
}

fn strip_root(path: &Path) -> PathBuf {
  path
    .components()
    .filter(|component| !matches!(component, Component::Prefix(_) | Component::RootDir))
    .collect()
}

fn normalise_lexically(path: &Path) -> PathBuf {
  let mut normalised = PathBuf::new();
  for component in path.components() {
    match component {
      Component::CurDir => {}
      Component::ParentDir => {
        // `..` at the root stays at the root.
        if matches!(normalised.components().next_back(), Some(Component::Normal(_))) {
          normalised.pop();
        }
      }
      other => normalised.push(other.as_os_str()),
    }
  }
  normalised
}
