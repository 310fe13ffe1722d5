//! # Execution Engine
//!
//! Loads a command template, renders it against the settings of the working
//! directory and either submits or runs it.
//!
//! Submitted runs are only recorded, with a submitted marker.
//! Local runs are recorded only when the process exits with code zero.

use crate::{
    constants::SQL_CLIENT_KEY,
    core::{
        command_repository::TemplateError,
        context_resolver::{ContextError, ContextManager},
        execution_log::{ExecutionLogger, LogError},
        interpolator::{Interpolator, RenderError, RenderedCommand},
        settings::SettingsError,
    },
    models::CommandType,
    system::executor::{CommandRunner, ExecutionError},
};
use colored::Colorize;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Log(#[from] LogError),
    #[error(transparent)]
    Execution(#[from] ExecutionError),
    #[error("Command '{name}' failed ({}).", exit_text(.code))]
    ExecutionFailed { name: String, code: Option<i32> },
}

pub type EngineResult<T> = Result<T, EngineError>;

fn exit_text(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

/// What happened to a rendered command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Submitted(RenderedCommand),
    Executed(RenderedCommand),
}

/// Runs the command template `name` in the given context.
///
/// `overrides` take precedence over every setting. With `execute_locally`
/// unset the rendered command is logged as submitted and returned, nothing runs.
pub fn run_command(
    context: &ContextManager,
    name: &str,
    overrides: &HashMap<String, String>,
    execute_locally: bool,
    runner: &dyn CommandRunner,
    logger: &dyn ExecutionLogger,
) -> EngineResult<RunOutcome> {
    let template = context.commands()?.load(name)?;
    let view = context.context_settings()?;
    let locator = context.input_locator();
    let interpolator = Interpolator::new(&view, overrides, &locator)?;
    let rendered = interpolator.render(&template)?;

    if !execute_locally {
        logger.log_submitted(&template, &rendered.components)?;
        return Ok(RunOutcome::Submitted(rendered));
    }

    let code = match template.command_type {
        CommandType::Exec => {
            println!("{} {}", "→".blue(), rendered.command_line.green());
            runner.run(&rendered.command_line, None, context.work_dir())?
        }
        CommandType::Sql => {
            let client = interpolator.lookup(SQL_CLIENT_KEY)?;
            println!(
                "{} {} {}",
                "→".blue(),
                rendered.command_line.green(),
                format!("| {}", client).dimmed()
            );
            let statement = format!("{}\n", rendered.command_line);
            runner.run(&client, Some(&statement), context.work_dir())?
        }
    };

    if code != Some(0) {
        log::debug!("'{}' exited with {:?}, not logged.", template.name, code);
        return Err(EngineError::ExecutionFailed {
            name: template.name,
            code,
        });
    }

    logger.log(&template, &rendered.components)?;
    Ok(RunOutcome::Executed(rendered))
}
