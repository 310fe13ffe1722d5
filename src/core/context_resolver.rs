//! # Context Resolver
//!
//! Maps a working directory onto its project and settings context:
//!
//! 1. Walks upward from the working directory to the closest directory that
//!    holds the `.prm` marker (the project base directory), collecting the
//!    directory names on the way. Those names, reversed, are the context path.
//! 2. Rejects working directories inside the marker itself, projects nested in
//!    other projects and projects with missing sub-structures.
//! 3. Builds the settings chain from the append-only context registry: the
//!    project settings file first, then one file per registered ancestor
//!    context, most specific last.

use crate::{
    constants::{CONTEXT_FILE_SUFFIX, REPO_DIR},
    core::{
        command_repository::{CommandRepository, TemplateError},
        config_resolver::SettingsView,
        interpolator::InputLocator,
        project::{self, ProjectError, ProjectRoot},
    },
    models::{ChainEntry, ContextPath},
};
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum ContextError {
    #[error("Filesystem Error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Project(#[from] ProjectError),
    #[error("Not under a project repository: '{path}'.")]
    NotAProject { path: PathBuf },
    #[error("Invalid working directory '{path}'.")]
    InvalidWorkingDirectory { path: PathBuf },
    #[error("Cannot create a context in the project base directory.")]
    ContextBaseConflict,
    #[error("A context already exists for '{path}'.")]
    ContextAlreadyExists { path: String },
    #[error("Directory name '{name}' cannot be used as a context (not UTF-8 or holds a tab or line break).")]
    InvalidContextName { name: String },
}

type ContextResult<T> = Result<T, ContextError>;

/// A working directory resolved against its project.
#[derive(Debug, Clone)]
pub struct ContextManager {
    root: ProjectRoot,
    work_dir: PathBuf,
    path: ContextPath,
}

/// Resolves a working directory to its project root and context path.
pub fn resolve_context(work_dir: &Path) -> ContextResult<ContextManager> {
    if !work_dir.is_dir() {
        return Err(ContextError::InvalidWorkingDirectory {
            path: work_dir.to_path_buf(),
        });
    }
    let abs_dir = dunce::canonicalize(work_dir)?;

    let mut segments = Vec::new();
    let mut base_dir = None;
    for dir in abs_dir.ancestors() {
        if project::has_marker(dir) {
            base_dir = Some(dir);
            break;
        }
        let Some(name) = dir.file_name() else {
            break;
        };
        if name == REPO_DIR {
            return Err(ContextError::InvalidWorkingDirectory { path: abs_dir });
        }
        segments.push(name.to_string_lossy().into_owned());
    }

    let base_dir = base_dir.ok_or_else(|| ContextError::NotAProject {
        path: abs_dir.clone(),
    })?;
    if let Some(outer) = project::find_marked_ancestor(base_dir) {
        return Err(ProjectError::NestedProject {
            outer,
            inner: base_dir.to_path_buf(),
        }
        .into());
    }
    let root = ProjectRoot::open(base_dir)?;

    segments.reverse();
    let path = ContextPath::new(segments);
    log::debug!(
        "Resolved '{}' to context '{}' of project '{}'.",
        abs_dir.display(),
        path,
        root.base_dir().display()
    );

    Ok(ContextManager {
        root,
        work_dir: abs_dir,
        path,
    })
}

impl ContextManager {
    pub fn root(&self) -> &ProjectRoot {
        &self.root
    }

    /// The canonical working directory this context was resolved from.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn path(&self) -> &ContextPath {
        &self.path
    }

    /// The settings chain for this context, root settings first.
    /// The registry is read once per call.
    pub fn settings_chain(&self) -> ContextResult<Vec<ChainEntry>> {
        let contexts = read_registry(&self.root.registry_file())?;
        let context_dir = self.root.context_dir();

        let mut chain = vec![ChainEntry {
            context: ContextPath::root(),
            file: self.root.settings_file(),
        }];
        for key in self.path.prefix_keys() {
            if let Some(file_id) = contexts.get(&key) {
                chain.push(ChainEntry {
                    context: ContextPath::parse(&key),
                    file: context_dir.join(file_id),
                });
            }
        }
        Ok(chain)
    }

    /// Settings for the working directory: the full chain.
    pub fn context_settings(&self) -> ContextResult<SettingsView> {
        Ok(SettingsView::new(self.settings_chain()?))
    }

    /// Project-wide settings: a chain that holds only the root settings file.
    pub fn project_settings(&self) -> SettingsView {
        SettingsView::new(vec![ChainEntry {
            context: ContextPath::root(),
            file: self.root.settings_file(),
        }])
    }

    /// Registers a new context for the working directory.
    ///
    /// Fails at the project base directory, when the most specific
    /// registered context already is the working directory and when a
    /// directory name on the way cannot be stored in the registry.
    pub fn create_context(&self) -> ContextResult<ChainEntry> {
        if self.path.is_root() {
            return Err(ContextError::ContextBaseConflict);
        }
        self.check_registry_names()?;
        let chain = self.settings_chain()?;
        if chain.last().map(|entry| &entry.context) == Some(&self.path) {
            return Err(ContextError::ContextAlreadyExists {
                path: self.path.key(),
            });
        }

        let context_dir = self.root.context_dir();
        let file_id = loop {
            let candidate = format!("{}{}", Uuid::new_v4().simple(), CONTEXT_FILE_SUFFIX);
            if !context_dir.join(&candidate).exists() {
                break candidate;
            }
        };

        let mut registry = OpenOptions::new()
            .append(true)
            .open(self.root.registry_file())?;
        writeln!(registry, "{}\t{}", self.path.key(), file_id)?;
        log::debug!("Registered context '{}' as '{}'.", self.path, file_id);

        Ok(ChainEntry {
            context: self.path.clone(),
            file: context_dir.join(file_id),
        })
    }

    // Registry records are tab-separated, one per line.
    fn check_registry_names(&self) -> ContextResult<()> {
        let relative = self
            .work_dir
            .strip_prefix(self.root.base_dir())
            .unwrap_or(self.work_dir.as_path());
        for segment in relative.iter() {
            match segment.to_str() {
                Some(name) if !name.contains(['\t', '\n', '\r']) => {}
                _ => {
                    return Err(ContextError::InvalidContextName {
                        name: segment.to_string_lossy().into_owned(),
                    });
                }
            }
        }
        Ok(())
    }

    /// The command template repository of this project.
    pub fn commands(&self) -> Result<CommandRepository, TemplateError> {
        CommandRepository::new(&self.root.command_dir())
    }

    /// Search path for input files: the working directory up to the base directory.
    pub fn input_locator(&self) -> InputLocator {
        InputLocator::new(&self.work_dir, self.root.base_dir())
    }
}

/// Reads the context registry into a map from context path to settings file
/// name. Later records for the same path replace earlier ones.
pub fn read_registry(path: &Path) -> ContextResult<HashMap<String, String>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(HashMap::new()),
        Err(e) => return Err(e.into()),
    };

    let mut contexts = HashMap::new();
    for line in content.lines() {
        let mut fields = line.trim().split('\t');
        match (fields.next(), fields.next(), fields.next()) {
            (Some(context), Some(file_id), None) => {
                contexts.insert(context.to_string(), file_id.to_string());
            }
            _ if line.trim().is_empty() => {}
            _ => log::warn!("Ignoring malformed context registry record: '{}'", line),
        }
    }
    Ok(contexts)
}
