//! # Settings Store
//!
//! Reads and writes single settings files (a YAML mapping each) and provides
//! the typed operations the rest of the crate builds on:
//!
//! - **`nested_merge`** folds a more specific mapping over a less specific one.
//! - **`get_value`** walks a dotted parameter path and only ever yields scalars.
//! - **`update_value`** sets or deletes a dotted parameter path in one mapping.
//!
//! An absent settings file is an empty mapping, never an error.

use crate::models::{Setting, Settings};
use serde_yaml::{Mapping, Value};
use std::collections::btree_map::Entry;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Could not read settings file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not write settings file '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Settings file '{path}' is not valid YAML: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("Settings file '{path}' does not contain a mapping.")]
    NotAMapping { path: PathBuf },
    #[error("Could not serialize settings: {0}")]
    Serialize(#[from] serde_yaml::Error),
    #[error("Unknown parameter '{0}'.")]
    UnknownParameter(String),
    #[error("Invalid parameter name '{0}'.")]
    InvalidParameterPath(String),
    #[error("Cannot use '{segment}' in '{para}' as a group: it already holds a value.")]
    PathConflict { para: String, segment: String },
}

pub type SettingsResult<T> = Result<T, SettingsError>;

// --- File I/O ---

/// Reads the settings mapping stored in `path`.
/// A missing or empty file yields an empty mapping.
pub fn read_settings(path: &Path) -> SettingsResult<Settings> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::trace!("Settings file '{}' does not exist yet.", path.display());
            return Ok(Settings::new());
        }
        Err(source) => {
            return Err(SettingsError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let document: Value = serde_yaml::from_str(&content).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    match document {
        Value::Null => Ok(Settings::new()),
        Value::Mapping(mapping) => Ok(from_mapping(mapping)),
        _ => Err(SettingsError::NotAMapping {
            path: path.to_path_buf(),
        }),
    }
}

/// Rewrites `path` in full with the given mapping.
///
/// The new content is written to a temporary file in the same directory and
/// then moved over the old file, so readers never observe a half-written file.
pub fn write_settings(path: &Path, settings: &Settings) -> SettingsResult<()> {
    let yaml = serde_yaml::to_string(&to_value(settings))?;
    let write_error = |source| SettingsError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp_file = NamedTempFile::new_in(dir).map_err(write_error)?;
    temp_file.write_all(yaml.as_bytes()).map_err(write_error)?;
    temp_file.flush().map_err(write_error)?;
    temp_file.persist(path).map_err(|e| write_error(e.error))?;

    log::debug!("Wrote settings file '{}'.", path.display());
    Ok(())
}

fn from_mapping(mapping: Mapping) -> Settings {
    mapping
        .into_iter()
        .map(|(key, value)| {
            let node = match value {
                Value::Mapping(inner) => Setting::Mapping(from_mapping(inner)),
                other => Setting::Scalar(other),
            };
            (key_to_string(key), node)
        })
        .collect()
}

fn key_to_string(key: Value) -> String {
    match key {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

/// Converts a settings tree back into a plain YAML value.
pub fn to_value(settings: &Settings) -> Value {
    let mapping: Mapping = settings
        .iter()
        .map(|(key, node)| {
            let value = match node {
                Setting::Scalar(v) => v.clone(),
                Setting::Mapping(inner) => to_value(inner),
            };
            (Value::String(key.clone()), value)
        })
        .collect();
    Value::Mapping(mapping)
}

// --- Merge ---

/// Merges `overlay` into `base`. Colliding keys take the overlay's value,
/// except that two mappings at the same key are merged recursively.
/// A scalar and a mapping at the same key never merge: the overlay wins.
pub fn nested_merge(mut base: Settings, overlay: Settings) -> Settings {
    for (key, value) in overlay {
        let merged = match (base.remove(&key), value) {
            (Some(Setting::Mapping(inner)), Setting::Mapping(over)) => {
                Setting::Mapping(nested_merge(inner, over))
            }
            (_, value) => value,
        };
        base.insert(key, merged);
    }
    base
}

// --- Traversal ---

/// Looks up the scalar at a dotted parameter path.
///
/// Fails with `UnknownParameter` if a segment is missing, if an intermediate
/// segment is a scalar, or if the path ends on a mapping.
pub fn get_value<'a>(settings: &'a Settings, para: &str) -> SettingsResult<&'a Value> {
    let unknown = || SettingsError::UnknownParameter(para.to_string());

    let mut node: Option<&Setting> = None;
    for comp in para.split('.') {
        let current = match node {
            None => settings,
            Some(Setting::Mapping(inner)) => inner,
            Some(Setting::Scalar(_)) => return Err(unknown()),
        };
        node = Some(current.get(comp).ok_or_else(unknown)?);
    }

    match node {
        Some(Setting::Scalar(value)) => Ok(value),
        _ => Err(unknown()),
    }
}

/// Looks up a dotted parameter path and renders it as command text.
pub fn get_text(settings: &Settings, para: &str) -> SettingsResult<String> {
    let value = get_value(settings, para)?;
    render_scalar(value).ok_or_else(|| SettingsError::UnknownParameter(para.to_string()))
}

/// Renders a scalar the way it appears in a command line.
///
/// Strings are verbatim, numbers and booleans use their YAML text, null is
/// empty and sequences join their rendered items with a single space.
/// Returns `None` for values that have no textual form (mappings).
pub fn render_scalar(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Sequence(items) => items
            .iter()
            .map(render_scalar)
            .collect::<Option<Vec<_>>>()
            .map(|parts| parts.join(" ")),
        Value::Mapping(_) => None,
        Value::Tagged(tagged) => render_scalar(&tagged.value),
    }
}

/// Returns the trimmed last segment of a dotted parameter path, failing with
/// `InvalidParameterPath` when it is blank.
pub fn terminal_key(para: &str) -> SettingsResult<&str> {
    para.rsplit('.')
        .next()
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .ok_or_else(|| SettingsError::InvalidParameterPath(para.to_string()))
}

/// Sets (`Some`) or deletes (`None`) the value at a dotted parameter path.
///
/// Missing intermediate mappings are created when setting. When deleting, a
/// missing intermediate mapping or terminal key means there is nothing to do.
/// Returns whether the mapping was changed.
pub fn update_value(
    settings: &mut Settings,
    para: &str,
    value: Option<Setting>,
) -> SettingsResult<bool> {
    let key = terminal_key(para)?;
    let segments: Vec<&str> = para.split('.').collect();
    let parents = segments.split_last().map(|(_, p)| p).unwrap_or_default();

    let mut current = settings;
    for comp in parents {
        let node = match current.entry((*comp).to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                if value.is_none() {
                    return Ok(false);
                }
                entry.insert(Setting::Mapping(Settings::new()))
            }
        };
        current = match node {
            Setting::Mapping(inner) => inner,
            Setting::Scalar(_) => {
                return Err(SettingsError::PathConflict {
                    para: para.to_string(),
                    segment: (*comp).to_string(),
                });
            }
        };
    }

    match value {
        Some(value) => {
            current.insert(key.to_string(), value);
            Ok(true)
        }
        None => Ok(current.remove(key).is_some()),
    }
}
