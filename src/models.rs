//! Data structures describing a bundler build manifest.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::de::{Deserializer, Error as _};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::manifest::prefix_path;

const FILE_FIELD: &str = "file";
const CSS_FIELD: &str = "css";

/// Build manifest keyed by source module identifier, in document order.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Manifest {
  entries: IndexMap<String, ManifestEntry>,
}

/// Output record for a single source module.
///
/// Field order of the source document is remembered, so an entry serialises back with its
/// fields where they were.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestEntry {
  /// Emitted output path for the module.
  pub file: String,
  /// Stylesheets emitted alongside the module.
  pub css: Stylesheets,
  /// Fields this crate does not interpret, carried through untouched.
  pub extra: Map<String, Value>,
  field_order: Vec<String>,
}

/// State of an entry's `css` field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Stylesheets {
  /// The entry has no `css` field.
  #[default]
  Absent,
  /// The field is present with a `null` value.
  Null,
  /// The field lists stylesheet paths.
  Listed(Vec<String>),
}

impl Stylesheets {
  /// Listed stylesheet paths, if any were recorded.
  pub fn as_slice(&self) -> Option<&[String]> {
    match self {
      Self::Listed(sheets) => Some(sheets.as_slice()),
      Self::Absent | Self::Null => None,
    }
  }

  /// Returns `true` when the entry carries a `css` field at all.
  pub fn is_present(&self) -> bool {
    !matches!(self, Self::Absent)
  }

  fn with_public_path(self, base: &str) -> Self {
    match self {
      Self::Listed(sheets) => Self::Listed(
        sheets
          .iter()
          .map(|sheet| prefix_path(base, sheet))
          .collect(),
      ),
      other => other,
    }
  }
}

impl Manifest {
  /// Number of entries in the manifest.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// Returns `true` when the manifest has no entries.
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Look up an entry by module key.
  pub fn get(&self, key: &str) -> Option<&ManifestEntry> {
    self.entries.get(key)
  }

  /// Iterate entries in document order.
  pub fn iter(&self) -> impl Iterator<Item = (&str, &ManifestEntry)> {
    self.entries.iter().map(|(key, entry)| (key.as_str(), entry))
  }

  /// Total number of stylesheet references across all entries.
  pub fn stylesheet_count(&self) -> usize {
    self
      .entries
      .values()
      .filter_map(|entry| entry.css.as_slice())
      .map(<[String]>::len)
      .sum()
  }

  /// Consume the manifest and return a copy with every path prefixed by `base`.
  ///
  /// Keys and their order are unchanged; no entry is added or dropped.
  pub fn with_public_path(self, base: &str) -> Self {
    let entries = self
      .entries
      .into_iter()
      .map(|(key, entry)| (key, entry.with_public_path(base)))
      .collect();
    Self { entries }
  }
}

impl FromIterator<(String, ManifestEntry)> for Manifest {
  fn from_iter<I: IntoIterator<Item = (String, ManifestEntry)>>(iter: I) -> Self {
    Self {
      entries: iter.into_iter().collect(),
    }
  }
}

impl ManifestEntry {
  /// Entry pointing at `file` with no stylesheets.
  pub fn new(file: impl Into<String>) -> Self {
    Self {
      file: file.into(),
      css: Stylesheets::Absent,
      extra: Map::new(),
      field_order: Vec::new(),
    }
  }

  /// Attach a stylesheet list.
  pub fn with_css<I, S>(mut self, css: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.css = Stylesheets::Listed(css.into_iter().map(Into::into).collect());
    self
  }

  /// Rewrite `file` and each stylesheet with the same prefix rule.
  pub fn with_public_path(self, base: &str) -> Self {
    Self {
      file: prefix_path(base, &self.file),
      css: self.css.with_public_path(base),
      extra: self.extra,
      field_order: self.field_order,
    }
  }

  /// Field names in output order: the source order first, then fields set after parsing.
  fn ordered_fields(&self) -> Vec<&str> {
    let mut fields: Vec<&str> = Vec::with_capacity(self.extra.len() + 2);
    for name in &self.field_order {
      if self.has_field(name) && !fields.contains(&name.as_str()) {
        fields.push(name);
      }
    }
    if !fields.contains(&FILE_FIELD) {
      fields.insert(0, FILE_FIELD);
    }
    if self.css.is_present() && !fields.contains(&CSS_FIELD) {
      fields.push(CSS_FIELD);
    }
    for name in self.extra.keys() {
      if !fields.contains(&name.as_str()) {
        fields.push(name);
      }
    }
    fields
  }

  fn has_field(&self, name: &str) -> bool {
    match name {
      FILE_FIELD => true,
      CSS_FIELD => self.css.is_present(),
      other => self.extra.contains_key(other),
    }
  }
}

impl Serialize for ManifestEntry {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let fields = self.ordered_fields();
    let mut map = serializer.serialize_map(Some(fields.len()))?;
    for name in fields {
      match name {
        FILE_FIELD => map.serialize_entry(FILE_FIELD, &self.file)?,
        CSS_FIELD => match &self.css {
          Stylesheets::Listed(sheets) => map.serialize_entry(CSS_FIELD, sheets)?,
          Stylesheets::Null => map.serialize_entry(CSS_FIELD, &Value::Null)?,
          Stylesheets::Absent => {}
        },
        other => {
          if let Some(value) = self.extra.get(other) {
            map.serialize_entry(other, value)?;
          }
        }
      }
    }
    map.end()
  }
}

impl<'de> Deserialize<'de> for ManifestEntry {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let fields = Map::<String, Value>::deserialize(deserializer)?;
    let mut field_order = Vec::with_capacity(fields.len());
    let mut file = None;
    let mut css = Stylesheets::Absent;
    let mut extra = Map::new();

    for (name, value) in fields {
      field_order.push(name.clone());
      match name.as_str() {
        FILE_FIELD => {
          file = Some(String::deserialize(value).map_err(D::Error::custom)?);
        }
        CSS_FIELD => {
          css = match value {
            Value::Null => Stylesheets::Null,
            other => Stylesheets::Listed(Vec::deserialize(other).map_err(D::Error::custom)?),
          };
        }
        _ => {
          extra.insert(name, value);
        }
      }
    }

    let file = file.ok_or_else(|| D::Error::missing_field(FILE_FIELD))?;
    Ok(Self {
      file,
      css,
      extra,
      field_order,
    })
  }
}

/// Outcome of a successful rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteSummary {
  /// Absolute path of the manifest that was rewritten in place.
  pub manifest_path: PathBuf,
  /// Number of entries whose `file` was rewritten.
  pub entries: usize,
  /// Number of stylesheet references rewritten.
  pub stylesheets: usize,
}
