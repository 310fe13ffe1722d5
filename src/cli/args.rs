// src/cli/args.rs
use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)] // The dispatcher has already consumed the command name.
pub struct InitArgs {}

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
pub struct ContextArgs {
    /// Create a settings context for the current directory first.
    #[arg(long)]
    pub create: bool,

    /// The variable to show or set (dotted paths address nested values).
    pub var: Option<String>,

    /// The new value. Without it the current value is shown.
    #[arg(allow_hyphen_values = true)]
    pub value: Option<String>,

    /// Set the value in every context along the path, not only the current one.
    #[arg(long, requires = "value")]
    pub cascade: bool,

    /// Delete a variable from the current context.
    #[arg(long, value_name = "VAR", conflicts_with_all = ["var", "delete_cascade", "create"])]
    pub delete: Option<String>,

    /// Delete a variable from every context along the path.
    #[arg(long, value_name = "VAR", conflicts_with_all = ["var", "create"])]
    pub delete_cascade: Option<String>,
}

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
pub struct ProjectArgs {
    /// The project-wide variable to show or set.
    pub var: Option<String>,

    /// The new value. Without it the current value is shown.
    #[arg(allow_hyphen_values = true)]
    pub value: Option<String>,

    /// Delete a project-wide variable.
    #[arg(long, value_name = "VAR", conflicts_with = "var")]
    pub delete: Option<String>,
}

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
pub struct RunArgs {
    /// The name of the command template.
    pub name: String,

    /// Variable overrides (e.g., "year=2023").
    pub overrides: Vec<String>,

    /// Only print and log the command line, do not execute it.
    #[arg(long)]
    pub submit: bool,
}

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
pub struct LogArgs {}

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
pub struct CommandsArgs {}
