// src/core/project.rs

use crate::constants::{
    COMMAND_DIR, CONTEXT_DIR, CONTEXTLIST_FILE, LOG_FILE, REPO_DIR, SETTINGS_FILE,
};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("Filesystem Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Corrupt project repository at '{repo_dir}': missing '{missing}'.")]
    CorruptProject { repo_dir: PathBuf, missing: String },
    #[error("A project repository already exists at '{path}'.")]
    AlreadyInitialized { path: PathBuf },
    #[error("Project repositories cannot be nested: '{inner}' is inside the project at '{outer}'.")]
    NestedProject { outer: PathBuf, inner: PathBuf },
}

type ProjectResult<T> = Result<T, ProjectError>;

/// The validated root of a project: the base directory that contains the
/// `.prm` marker directory, plus the paths of everything inside the marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRoot {
    base_dir: PathBuf,
    repo_dir: PathBuf,
}

impl ProjectRoot {
    /// Opens the project whose marker directory lives in `base_dir`, checking
    /// that all required sub-structures exist.
    pub fn open(base_dir: &Path) -> ProjectResult<Self> {
        let root = Self {
            base_dir: base_dir.to_path_buf(),
            repo_dir: base_dir.join(REPO_DIR),
        };

        let required_dirs = [COMMAND_DIR, CONTEXT_DIR];
        let required_files = [CONTEXTLIST_FILE, SETTINGS_FILE, LOG_FILE];
        for name in required_dirs {
            if !root.repo_dir.join(name).is_dir() {
                return Err(root.corrupt(name));
            }
        }
        for name in required_files {
            if !root.repo_dir.join(name).is_file() {
                return Err(root.corrupt(name));
            }
        }

        Ok(root)
    }

    fn corrupt(&self, missing: &str) -> ProjectError {
        ProjectError::CorruptProject {
            repo_dir: self.repo_dir.clone(),
            missing: missing.to_string(),
        }
    }

    /// The directory that contains the marker (the project base directory).
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// The marker directory itself.
    pub fn repo_dir(&self) -> &Path {
        &self.repo_dir
    }

    pub fn command_dir(&self) -> PathBuf {
        self.repo_dir.join(COMMAND_DIR)
    }

    pub fn context_dir(&self) -> PathBuf {
        self.repo_dir.join(CONTEXT_DIR)
    }

    pub fn registry_file(&self) -> PathBuf {
        self.repo_dir.join(CONTEXTLIST_FILE)
    }

    pub fn settings_file(&self) -> PathBuf {
        self.repo_dir.join(SETTINGS_FILE)
    }

    pub fn log_file(&self) -> PathBuf {
        self.repo_dir.join(LOG_FILE)
    }
}

/// Returns true if `dir` directly contains a project marker directory.
pub fn has_marker(dir: &Path) -> bool {
    dir.join(REPO_DIR).is_dir()
}

/// Finds the closest strict ancestor of `dir` that contains a marker directory.
pub fn find_marked_ancestor(dir: &Path) -> Option<PathBuf> {
    dir.ancestors()
        .skip(1)
        .find(|ancestor| has_marker(ancestor))
        .map(Path::to_path_buf)
}

/// Creates the on-disk skeleton of a new project in `dir`.
///
/// Fails if `dir` already holds a marker (file or directory) or if any of its
/// ancestors is already a project root.
pub fn initialize(dir: &Path) -> ProjectResult<ProjectRoot> {
    let base_dir = dunce::canonicalize(dir)?;
    let repo_dir = base_dir.join(REPO_DIR);

    if repo_dir.exists() {
        return Err(ProjectError::AlreadyInitialized { path: repo_dir });
    }
    if let Some(outer) = find_marked_ancestor(&base_dir) {
        return Err(ProjectError::NestedProject {
            outer,
            inner: base_dir,
        });
    }

    log::debug!("Creating project repository at '{}'.", repo_dir.display());
    fs::create_dir(&repo_dir)?;
    fs::create_dir(repo_dir.join(COMMAND_DIR))?;
    fs::create_dir(repo_dir.join(CONTEXT_DIR))?;
    for name in [CONTEXTLIST_FILE, LOG_FILE, SETTINGS_FILE] {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(repo_dir.join(name))?;
    }

    ProjectRoot::open(&base_dir)
}
