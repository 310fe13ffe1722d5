// src/cli/handlers/init.rs

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::env;

use crate::{cli::args::InitArgs, core::project};

/// Creates the project repository in the current directory.
pub fn handle(args: Vec<String>) -> Result<()> {
    let _init_args = InitArgs::parse_from(&args);

    let target_dir = env::current_dir().context("Could not determine the current directory.")?;
    let root = project::initialize(&target_dir)?;

    println!("{}", t!("init.success").green());
    println!("  {}", root.repo_dir().display());
    Ok(())
}
