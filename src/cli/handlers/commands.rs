// src/cli/handlers/commands.rs

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use super::commons;
use crate::{cli::args::CommandsArgs, core::context_resolver::ContextManager};

/// Lists the command templates of the current project.
pub fn handle(args: Vec<String>) -> Result<()> {
    let _commands_args = CommandsArgs::parse_from(&args);
    let entries = entries(&commons::current_context()?)?;

    if entries.is_empty() {
        println!("{}", t!("commands.empty").dimmed());
        return Ok(());
    }
    let width = entries.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    for (name, description) in entries {
        match description {
            Some(text) => println!("{}  {}", format!("{:<width$}", name).cyan(), text.dimmed()),
            None => println!("{}", name.cyan()),
        }
    }
    Ok(())
}

/// Template names with their descriptions. A template that cannot be read is
/// still listed, without a description.
fn entries(context: &ContextManager) -> Result<Vec<(String, Option<String>)>> {
    let repository = context.commands()?;
    Ok(repository
        .list()?
        .into_iter()
        .map(|name| {
            let description = match repository.load(&name) {
                Ok(template) => template.description,
                Err(e) => {
                    log::warn!("Could not read command template '{}': {}", name, e);
                    None
                }
            };
            (name, description)
        })
        .collect())
}
