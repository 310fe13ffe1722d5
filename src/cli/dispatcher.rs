// src/cli/dispatcher.rs

use anyhow::{Result, anyhow};
use colored::Colorize;

use crate::cli::{build_help_string, handlers};

/// A CLI command, its aliases and its handler.
struct CommandDefinition {
    name: &'static str,
    aliases: &'static [&'static str],
    handler: fn(Vec<String>) -> Result<()>,
}

/// Every command the binary understands.
static COMMAND_REGISTRY: &[CommandDefinition] = &[
    CommandDefinition {
        name: "init",
        aliases: &[],
        handler: handlers::init::handle,
    },
    CommandDefinition {
        name: "context",
        aliases: &["ctx"],
        handler: handlers::context::handle,
    },
    CommandDefinition {
        name: "project",
        aliases: &[],
        handler: handlers::project::handle,
    },
    CommandDefinition {
        name: "commands",
        aliases: &["ls"],
        handler: handlers::commands::handle,
    },
    CommandDefinition {
        name: "run",
        aliases: &[],
        handler: handlers::run::handle,
    },
    CommandDefinition {
        name: "log",
        aliases: &["history"],
        handler: handlers::history::handle,
    },
];

/// Finds a command definition in the registry by its name or alias.
fn find_command(name: &str) -> Option<&'static CommandDefinition> {
    COMMAND_REGISTRY
        .iter()
        .find(|cmd| cmd.name == name || cmd.aliases.contains(&name))
}

/// Routes `<command> [args...]` to its handler. No arguments prints the help.
pub fn dispatch(all_args: Vec<String>) -> Result<()> {
    log::debug!("Dispatching args: {:?}", all_args);

    let mut args = all_args.into_iter();
    let Some(name) = args.next() else {
        print!("{}", build_help_string());
        return Ok(());
    };

    let command = find_command(&name).ok_or_else(|| {
        anyhow!(
            "Unknown command '{}'. Run '{}' for usage.",
            name.cyan(),
            "prm --help".cyan()
        )
    })?;
    (command.handler)(args.collect())
}
