// src/core/execution_log.rs

use crate::models::{IoType, Template};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LogError {
    #[error("Could not access execution log: {0}")]
    Io(#[from] std::io::Error),
    #[error("Corrupt execution log record: {0}")]
    Json(#[from] serde_json::Error),
}

/// One command run, stored as a single JSON line.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub name: String,
    pub components: Vec<LogComponent>,
    /// Set for runs that were only submitted, never executed locally.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub submitted: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LogComponent {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub io: Option<IoType>,
    /// `"True"` or `"False"`, present only on IO components.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
}

impl LogRecord {
    /// Pairs each rendered string with the component it was rendered from.
    pub fn new(command: &Template, rendered: &[String], submitted: bool) -> Self {
        let components = command
            .components
            .iter()
            .zip(rendered)
            .map(|(component, value)| LogComponent {
                value: value.clone(),
                io: component.io_type,
                input: component
                    .io_type
                    .map(|_| String::from(if component.as_input { "True" } else { "False" })),
            })
            .collect();
        Self {
            name: command.name.clone(),
            components,
            submitted,
        }
    }

    /// `<name> <values...>`, prefixed with `*` for submitted runs.
    pub fn line(&self) -> String {
        let mut parts = vec![self.name.as_str()];
        parts.extend(self.components.iter().map(|c| c.value.as_str()));
        let line = parts.join(" ");
        if self.submitted { format!("*{}", line) } else { line }
    }
}

/// Receives every successful or submitted run.
pub trait ExecutionLogger {
    fn log(&self, command: &Template, components: &[String]) -> Result<(), LogError>;
    fn log_submitted(&self, command: &Template, components: &[String]) -> Result<(), LogError>;
}

/// The append-only JSON-lines log inside the project repository.
#[derive(Debug, Clone)]
pub struct ExecutionLog {
    path: PathBuf,
}

impl ExecutionLog {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// All records in the order they were written.
    pub fn records(&self) -> Result<Vec<LogRecord>, LogError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(LogError::from))
            .collect()
    }

    pub fn lines(&self) -> Result<Vec<String>, LogError> {
        Ok(self.records()?.iter().map(LogRecord::line).collect())
    }

    pub fn append(&self, record: &LogRecord) -> Result<(), LogError> {
        let line = serde_json::to_string(record)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)?;
        log::debug!("Logged run of '{}' to '{}'.", record.name, self.path.display());
        Ok(())
    }
}

impl ExecutionLogger for ExecutionLog {
    fn log(&self, command: &Template, components: &[String]) -> Result<(), LogError> {
        self.append(&LogRecord::new(command, components, false))
    }

    fn log_submitted(&self, command: &Template, components: &[String]) -> Result<(), LogError> {
        self.append(&LogRecord::new(command, components, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CommandType, Component, ComponentKind};
    use tempfile::tempdir;

    fn command() -> Template {
        Template {
            name: "convert".to_string(),
            command_type: CommandType::Exec,
            components: vec![
                Component::constant("convert"),
                Component::new(ComponentKind::Var, "[[in]]", Some(IoType::File), true).unwrap(),
                Component::new(ComponentKind::Var, "[[out]]", Some(IoType::Dir), false).unwrap(),
            ],
            description: None,
        }
    }

    fn rendered() -> Vec<String> {
        vec!["convert".to_string(), "a.csv".to_string(), "out".to_string()]
    }

    #[test]
    fn test_record_format() {
        let record = LogRecord::new(&command(), &rendered(), false);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "convert",
                "components": [
                    {"value": "convert"},
                    {"value": "a.csv", "io": "FILE", "input": "True"},
                    {"value": "out", "io": "DIR", "input": "False"},
                ]
            })
        );
    }

    #[test]
    fn test_append_and_read_lines() {
        let dir = tempdir().unwrap();
        let log = ExecutionLog::new(&dir.path().join("LOG"));
        assert!(log.lines().unwrap().is_empty());

        log.log(&command(), &rendered()).unwrap();
        log.log_submitted(&command(), &rendered()).unwrap();

        assert_eq!(
            log.lines().unwrap(),
            vec!["convert convert a.csv out", "*convert convert a.csv out"]
        );
        let records = log.records().unwrap();
        assert!(!records[0].submitted);
        assert!(records[1].submitted);
    }

    #[test]
    fn test_corrupt_record() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("LOG");
        fs::write(&path, "not json\n").unwrap();
        assert!(matches!(
            ExecutionLog::new(&path).records(),
            Err(LogError::Json(_))
        ));
    }
}
