// src/system/executor.rs

use std::io::{ErrorKind, Write};
use std::path::Path;
use std::process::{Command as StdCommand, Stdio};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Command could not be parsed: {0}")]
    CommandParse(String),
    #[error("No command specified to run.")]
    EmptyCommand,
    #[error("Command '{0}' could not be executed: {1}")]
    CommandFailed(String, std::io::Error),
}

/// Runs a rendered command line and reports its exit code.
pub trait CommandRunner {
    /// Runs `command_line` in `cwd`, feeding `stdin` to the child if given.
    /// Returns the exit code, or `None` if the process was killed by a signal.
    fn run(
        &self,
        command_line: &str,
        stdin: Option<&str>,
        cwd: &Path,
    ) -> Result<Option<i32>, ExecutionError>;
}

/// Spawns real processes with inherited stdout and stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(
        &self,
        command_line: &str,
        stdin: Option<&str>,
        cwd: &Path,
    ) -> Result<Option<i32>, ExecutionError> {
        execute_command(command_line, stdin, cwd)
    }
}

/// Executes a system command and waits for it to finish.
pub fn execute_command(
    command_line: &str,
    stdin: Option<&str>,
    cwd: &Path,
) -> Result<Option<i32>, ExecutionError> {
    let trimmed_command = command_line.trim();
    let parts = shlex::split(trimmed_command)
        .ok_or_else(|| ExecutionError::CommandParse(trimmed_command.to_string()))?;
    let Some((program, args)) = parts.split_first() else {
        return Err(ExecutionError::EmptyCommand);
    };
    let clean_cwd = dunce::simplified(cwd);
    let failed = |e: std::io::Error| ExecutionError::CommandFailed(trimmed_command.to_string(), e);

    let stdin_mode = || {
        if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::inherit()
        }
    };

    let mut command = StdCommand::new(program);
    command
        .args(args)
        .current_dir(clean_cwd)
        .stdin(stdin_mode())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    // Fallback for Windows built-ins like `echo`: retry through `cmd /C`.
    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) if e.kind() == ErrorKind::NotFound && cfg!(target_os = "windows") => {
            log::debug!("Command '{}' not found. Retrying with cmd /C.", program);
            StdCommand::new("cmd")
                .arg("/C")
                .arg(trimmed_command)
                .current_dir(clean_cwd)
                .stdin(stdin_mode())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .spawn()
                .map_err(failed)?
        }
        Err(e) => return Err(failed(e)),
    };

    if let Some(input) = stdin {
        // Dropping the handle closes the pipe so the child sees EOF.
        if let Some(mut pipe) = child.stdin.take() {
            pipe.write_all(input.as_bytes()).map_err(failed)?;
        }
    }

    let status = child.wait().map_err(failed)?;
    log::debug!("Command '{}' finished with {}.", trimmed_command, status);
    Ok(status.code())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_empty_and_unparsable_commands() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            execute_command("   ", None, dir.path()),
            Err(ExecutionError::EmptyCommand)
        ));
        assert!(matches!(
            execute_command("echo 'unterminated", None, dir.path()),
            Err(ExecutionError::CommandParse(_))
        ));
    }

    #[test]
    fn test_missing_program() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            execute_command("prm-no-such-program-xyz", None, dir.path()),
            Err(ExecutionError::CommandFailed(..))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_codes() {
        let dir = tempdir().unwrap();
        assert_eq!(execute_command("true", None, dir.path()).unwrap(), Some(0));
        assert_eq!(execute_command("false", None, dir.path()).unwrap(), Some(1));
        assert_eq!(
            ProcessRunner.run("sh -c 'exit 3'", None, dir.path()).unwrap(),
            Some(3)
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_stdin_and_working_directory() {
        let dir = tempdir().unwrap();
        let status = execute_command(
            "sh -c 'cat > piped.txt'",
            Some("SELECT 1;\n"),
            dir.path(),
        )
        .unwrap();
        assert_eq!(status, Some(0));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("piped.txt")).unwrap(),
            "SELECT 1;\n"
        );
    }
}
