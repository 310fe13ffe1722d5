// src/cli/handlers/history.rs

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use super::commons;
use crate::{cli::args::LogArgs, core::execution_log::ExecutionLog};

/// Prints the execution history, oldest first. Submitted runs start with `*`.
pub fn handle(args: Vec<String>) -> Result<()> {
    let _log_args = LogArgs::parse_from(&args);
    let context = commons::current_context()?;
    let lines = ExecutionLog::new(&context.root().log_file()).lines()?;

    if lines.is_empty() {
        println!("{}", t!("log.empty").dimmed());
        return Ok(());
    }
    for line in lines {
        match line.strip_prefix('*') {
            Some(submitted) => println!("{}{}", "*".yellow(), submitted),
            None => println!("{}", line),
        }
    }
    Ok(())
}
