// src/bin/prm.rs

use clap::Parser;
use colored::Colorize;
use prm::{
    cli::{Cli, dispatcher},
    core::task_executor::EngineError,
};

/// Sets up logging, dispatches the command line and reports errors in one place.
fn main() {
    env_logger::init();

    if let Err(e) = dispatcher::dispatch(Cli::parse().args) {
        eprintln!("\n{}: {}", "Error".red().bold(), e);

        // A failed run exits with the child's own code.
        if let Some(EngineError::ExecutionFailed { code, .. }) = e.downcast_ref::<EngineError>() {
            eprintln!("{}", prm::t!("run.not_logged").yellow());
            std::process::exit(code.unwrap_or(1));
        }
        std::process::exit(1);
    }
}
