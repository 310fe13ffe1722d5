// src/cli/handlers/project.rs

use anyhow::Result;
use clap::Parser;

use super::commons;
use crate::{cli::args::ProjectArgs, core::context_resolver::ContextManager};

/// Shows and edits the project-wide settings file.
pub fn handle(args: Vec<String>) -> Result<()> {
    let project_args = ProjectArgs::parse_from(&args);
    let context = commons::current_context()?;
    apply(&context, &project_args)
}

fn apply(context: &ContextManager, project_args: &ProjectArgs) -> Result<()> {
    let view = context.project_settings();

    if let Some(var) = &project_args.delete {
        return commons::delete(&view, var, false);
    }
    commons::show_or_set(
        &view,
        project_args.var.as_deref(),
        project_args.value.as_deref(),
        false,
    )
}
