// src/cli/handlers/run.rs

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use super::commons;
use crate::{
    cli::args::RunArgs,
    core::{
        execution_log::ExecutionLog,
        task_executor::{self, RunOutcome},
    },
    system::executor::ProcessRunner,
};

/// Renders a command template and runs or submits it.
pub fn handle(args: Vec<String>) -> Result<()> {
    let run_args = RunArgs::parse_from(&args);
    let overrides = commons::parse_overrides(&run_args.overrides)?;
    let context = commons::current_context()?;
    let log = ExecutionLog::new(&context.root().log_file());

    let outcome = task_executor::run_command(
        &context,
        &run_args.name,
        &overrides,
        !run_args.submit,
        &ProcessRunner,
        &log,
    )?;

    if let RunOutcome::Submitted(rendered) = outcome {
        println!("{}", t!("run.submitted").yellow());
        println!("{}", rendered.command_line);
    }
    Ok(())
}
