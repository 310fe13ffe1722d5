// src/core/test_support.rs
//
// On-disk project fixtures shared by the test modules.

use crate::core::project::{self, ProjectRoot};
use std::fs;
use std::path::PathBuf;
use tempfile::{TempDir, tempdir};

/// A freshly initialized project living in a temporary directory.
pub(crate) struct Fixture {
    _dir: TempDir,
    pub(crate) root: ProjectRoot,
}

impl Fixture {
    /// Absolute path of a directory relative to the project base directory.
    pub(crate) fn path(&self, relative: &str) -> PathBuf {
        self.root.base_dir().join(relative)
    }

    pub(crate) fn write_command(&self, name: &str, yaml: &str) {
        fs::write(self.root.command_dir().join(format!("{}.yaml", name)), yaml).unwrap();
    }
}

/// Project with root settings `{a: 1, b: 2}`, a registered context `db` with
/// settings `{b: 1, c: 2}` and the directories `db/` and `db/sub/`.
pub(crate) fn project_fixture() -> Fixture {
    let dir = tempdir().unwrap();
    let root = project::initialize(dir.path()).unwrap();

    fs::write(root.settings_file(), "a: 1\nb: 2\n").unwrap();
    fs::write(root.context_dir().join("A.yaml"), "b: 1\nc: 2\n").unwrap();
    fs::write(root.registry_file(), "db\tA.yaml\n").unwrap();
    fs::create_dir_all(root.base_dir().join("db").join("sub")).unwrap();

    Fixture { _dir: dir, root }
}
