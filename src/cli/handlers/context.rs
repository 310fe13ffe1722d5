// src/cli/handlers/context.rs

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use super::commons;
use crate::{cli::args::ContextArgs, core::context_resolver::ContextManager};

/// Shows and edits the settings of the current directory's context.
pub fn handle(args: Vec<String>) -> Result<()> {
    let context_args = ContextArgs::parse_from(&args);
    let context = commons::current_context()?;
    apply(&context, &context_args)
}

fn apply(context: &ContextManager, context_args: &ContextArgs) -> Result<()> {
    if context_args.create {
        let entry = context.create_context()?;
        log::debug!("New context settings file: '{}'.", entry.file.display());
        println!("{} {}", t!("context.created").green(), context.path().to_string().cyan());
        if context_args.var.is_none() {
            return Ok(());
        }
    }

    let view = context.context_settings()?;
    if let Some(var) = &context_args.delete {
        return commons::delete(&view, var, false);
    }
    if let Some(var) = &context_args.delete_cascade {
        return commons::delete(&view, var, true);
    }

    commons::show_or_set(
        &view,
        context_args.var.as_deref(),
        context_args.value.as_deref(),
        context_args.cascade,
    )
}
