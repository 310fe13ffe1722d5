// src/models.rs

use crate::core::interpolator::{self, TokenError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

// --- SETTINGS MODELS ---

/// A single node of a settings tree.
///
/// Scalars keep their original YAML type so that rewriting a settings file
/// leaves untouched values exactly as the user wrote them.
#[derive(Debug, Clone, PartialEq)]
pub enum Setting {
    /// Any YAML value that is not a mapping (string, number, bool, null, sequence).
    Scalar(serde_yaml::Value),
    /// A nested mapping of further settings.
    Mapping(Settings),
}

impl Setting {
    /// Creates a string scalar, the form used for every value set from the CLI.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Scalar(serde_yaml::Value::String(value.into()))
    }
}

/// A settings mapping. Keys are kept sorted, which is also the order in which
/// they are written back to disk.
pub type Settings = BTreeMap<String, Setting>;

// --- CONTEXT MODELS ---

/// Relative address of a working directory from the project root.
/// The empty path is the root itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ContextPath {
    segments: Vec<String>,
}

impl ContextPath {
    /// Builds a context path from its directory-name segments, root first.
    pub fn new(segments: Vec<String>) -> Self {
        Self { segments }
    }

    /// The path of the project root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses a registry key (`db/sub`). Empty segments are dropped.
    pub fn parse(key: &str) -> Self {
        Self {
            segments: key
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The registry key of this path (segments joined with `/`).
    pub fn key(&self) -> String {
        self.segments.join("/")
    }

    /// Registry keys of every non-empty prefix, shortest first, ending with
    /// the full path itself.
    pub fn prefix_keys(&self) -> Vec<String> {
        (1..=self.segments.len())
            .filter_map(|i| self.segments.get(..i))
            .map(|prefix| prefix.join("/"))
            .collect()
    }
}

impl fmt::Display for ContextPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// One element of a settings chain: the context it belongs to and the file
/// that holds its settings. The root settings file has the empty context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainEntry {
    pub context: ContextPath,
    pub file: PathBuf,
}

// --- COMMAND TEMPLATE MODELS ---

/// What a rendered template is: a shell command line or a SQL statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandType {
    #[serde(rename = "EXEC")]
    Exec,
    #[serde(rename = "SQL")]
    Sql,
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exec => f.write_str("EXEC"),
            Self::Sql => f.write_str("SQL"),
        }
    }
}

/// Whether a component is taken verbatim or contains variable references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    #[serde(rename = "CONST")]
    Const,
    #[serde(rename = "VAR")]
    Var,
}

/// File-system resource referenced by an IO component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IoType {
    #[serde(rename = "FILE")]
    File,
    #[serde(rename = "DIR")]
    Dir,
}

impl fmt::Display for IoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => f.write_str("FILE"),
            Self::Dir => f.write_str("DIR"),
        }
    }
}

/// A piece of a VAR component: literal text or a `[[name]]` reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    Literal(String),
    Variable(String),
}

/// One constant or variable unit of a command template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub kind: ComponentKind,
    pub value: String,
    pub io_type: Option<IoType>,
    pub as_input: bool,
    tokens: Vec<Token>,
}

impl Component {
    /// Builds a component, tokenizing the value of VAR components up front.
    pub fn new(
        kind: ComponentKind,
        value: impl Into<String>,
        io_type: Option<IoType>,
        as_input: bool,
    ) -> Result<Self, TokenError> {
        let value = value.into();
        let tokens = match kind {
            ComponentKind::Const => vec![Token::Literal(value.clone())],
            ComponentKind::Var => interpolator::tokenize(&value)?,
        };
        Ok(Self {
            kind,
            value,
            io_type,
            as_input,
            tokens,
        })
    }

    /// A plain constant component.
    pub fn constant(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            kind: ComponentKind::Const,
            tokens: vec![Token::Literal(value.clone())],
            value,
            io_type: None,
            as_input: false,
        }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// True for VAR components that name an input file or directory.
    /// `as_input` has no effect anywhere else.
    pub fn is_input(&self) -> bool {
        self.kind == ComponentKind::Var && self.io_type.is_some() && self.as_input
    }
}

/// A named command template loaded from the command repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub name: String,
    pub command_type: CommandType,
    pub components: Vec<Component>,
    pub description: Option<String>,
}
