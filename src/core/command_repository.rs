// src/core/command_repository.rs

use crate::{
    constants::COMMAND_SPEC_SUFFIX,
    core::settings,
    models::{CommandType, Component, ComponentKind, IoType, Template},
};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Filesystem Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not list command directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Not a valid command directory '{0}'.")]
    InvalidDirectory(PathBuf),
    #[error("Unknown command '{0}'.")]
    UnknownCommand(String),
    #[error("Malformed command template '{name}': {reason}")]
    MalformedTemplate { name: String, reason: String },
}

type TemplateResult<T> = Result<T, TemplateError>;

// --- On-disk document (what a template file looks like) ---
//
// type: EXEC | SQL
// description: optional text
// spec:
//   components:
//     - type: CONST | VAR
//       value: string
//       ioType: FILE | DIR     (optional)
//       asInput: bool          (optional)

#[derive(Deserialize, Debug)]
struct TemplateDocument {
    #[serde(rename = "type")]
    command_type: CommandType,
    #[serde(default)]
    description: Option<String>,
    spec: SpecDocument,
}

#[derive(Deserialize, Debug)]
struct SpecDocument {
    components: Vec<ComponentDocument>,
}

#[derive(Deserialize, Debug)]
struct ComponentDocument {
    #[serde(rename = "type")]
    kind: ComponentKind,
    value: serde_yaml::Value,
    #[serde(rename = "ioType", default)]
    io_type: Option<IoType>,
    #[serde(rename = "asInput", default)]
    as_input: bool,
}

/// Command templates stored as one YAML file per command in a single directory.
#[derive(Debug, Clone)]
pub struct CommandRepository {
    base_dir: PathBuf,
}

impl CommandRepository {
    pub fn new(base_dir: &Path) -> TemplateResult<Self> {
        if !base_dir.is_dir() {
            return Err(TemplateError::InvalidDirectory(base_dir.to_path_buf()));
        }
        Ok(Self {
            base_dir: base_dir.to_path_buf(),
        })
    }

    /// Loads the template stored in `<name>.yaml`.
    pub fn load(&self, name: &str) -> TemplateResult<Template> {
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(TemplateError::UnknownCommand(name.to_string()));
        }
        let file = self.base_dir.join(format!("{}{}", name, COMMAND_SPEC_SUFFIX));
        if !file.is_file() {
            return Err(TemplateError::UnknownCommand(name.to_string()));
        }

        log::debug!("Loading command template '{}'.", file.display());
        let content = fs::read_to_string(&file)?;
        parse_template(name, &content)
    }

    /// Names of all stored templates, lower-cased.
    pub fn list(&self) -> TemplateResult<BTreeSet<String>> {
        let mut names = BTreeSet::new();
        for entry in WalkDir::new(&self.base_dir).min_depth(1).max_depth(1) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(name) = entry
                .file_name()
                .to_str()
                .and_then(|f| f.strip_suffix(COMMAND_SPEC_SUFFIX))
            {
                names.insert(name.to_lowercase());
            }
        }
        Ok(names)
    }
}

/// Parses a template document, tokenizing every VAR component.
pub fn parse_template(name: &str, content: &str) -> TemplateResult<Template> {
    let malformed = |reason: String| TemplateError::MalformedTemplate {
        name: name.to_string(),
        reason,
    };

    let document: TemplateDocument =
        serde_yaml::from_str(content).map_err(|e| malformed(e.to_string()))?;

    let components = document
        .spec
        .components
        .into_iter()
        .enumerate()
        .map(|(i, doc)| {
            let value = settings::render_scalar(&doc.value).ok_or_else(|| {
                malformed(format!("component {} has a non-text value", i + 1))
            })?;
            Component::new(doc.kind, value, doc.io_type, doc.as_input)
                .map_err(|e| malformed(format!("component {}: {}", i + 1, e)))
        })
        .collect::<TemplateResult<Vec<_>>>()?;

    Ok(Template {
        name: name.to_string(),
        command_type: document.command_type,
        components,
        description: document.description,
    })
}
