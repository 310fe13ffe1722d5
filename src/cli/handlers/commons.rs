// src/cli/handlers/commons.rs

// Helpers shared by the command handlers.

use anyhow::{Context, Result};
use colored::Colorize;
use std::collections::HashMap;
use std::env;
use thiserror::Error;

use crate::core::{
    config_resolver::SettingsView,
    context_resolver::{self, ContextManager},
    settings,
};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("Invalid override '{0}': expected <var>=<value>.")]
    InvalidOverride(String),
}

/// Resolves the process working directory to its project context.
pub fn current_context() -> Result<ContextManager> {
    let cwd = env::current_dir().context("Could not determine the current directory.")?;
    Ok(context_resolver::resolve_context(&cwd)?)
}

/// Parses `<var>=<value>` arguments. Only the first `=` separates.
pub fn parse_overrides(args: &[String]) -> Result<HashMap<String, String>, ArgumentError> {
    args.iter()
        .map(|arg| {
            arg.split_once('=')
                .filter(|(var, _)| !var.trim().is_empty())
                .map(|(var, value)| (var.to_string(), value.to_string()))
                .ok_or_else(|| ArgumentError::InvalidOverride(arg.clone()))
        })
        .collect()
}

/// The shared `<var> [<value>]` grammar of `context` and `project`:
/// no variable dumps all settings, a variable alone prints its value and a
/// variable with a value sets it.
pub fn show_or_set(
    view: &SettingsView,
    var: Option<&str>,
    value: Option<&str>,
    cascade: bool,
) -> Result<()> {
    match (var, value) {
        (None, _) => print_settings(view),
        (Some(var), None) => {
            println!("{}", view.get(var)?);
            Ok(())
        }
        (Some(var), Some(value)) => {
            set(view, var, value, cascade)?;
            Ok(())
        }
    }
}

/// Sets a variable and tells the user when no file took the value.
pub fn set(view: &SettingsView, var: &str, value: &str, cascade: bool) -> Result<usize> {
    let rewritten = view.set(var, Some(value), cascade)?;
    log::debug!("Set '{}' in {} settings file(s).", var, rewritten);
    if rewritten == 0 {
        println!("{} {}", t!("settings.not_written").yellow(), var.cyan());
    }
    Ok(rewritten)
}

/// Deletes a variable and tells the user when there was nothing to delete.
pub fn delete(view: &SettingsView, var: &str, cascade: bool) -> Result<()> {
    if view.set(var, None, cascade)? == 0 {
        println!("{} {}", t!("settings.not_set").yellow(), var.cyan());
    }
    Ok(())
}

/// Prints the merged view as YAML.
pub fn print_settings(view: &SettingsView) -> Result<()> {
    let merged = view.merged()?;
    if merged.is_empty() {
        println!("{}", t!("settings.empty").dimmed());
        return Ok(());
    }
    let text = serde_yaml::to_string(&settings::to_value(&merged))
        .context("Could not render settings.")?;
    print!("{}", text);
    Ok(())
}
