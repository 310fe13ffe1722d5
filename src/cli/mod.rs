// src/cli/mod.rs

use clap::Parser;

pub mod args;
pub mod dispatcher;
pub mod handlers;

/// Builds the color-aware help text from the `cli.help.template` message.
pub fn build_help_string() -> &'static str {
    let use_colors = colored::control::SHOULD_COLORIZE.should_colorize();
    let template = t!("cli.help.template");

    let style = |code: &'static str| if use_colors { code } else { "" };
    let title = style("\x1b[1;33m"); // bold yellow
    let hl = style("\x1b[1;36m");
    let cmd = style("\x1b[36m");
    let group = style("\x1b[1;32m");
    let err = style("\x1b[91m");
    let dim = style("\x1b[2m");
    let reset = style("\x1b[0m");

    let formatted_string = template
        .replace("<title>", title)
        .replace("</title>", reset)
        .replace("<hl>", hl)
        .replace("</hl>", reset)
        .replace("<cmd>", cmd)
        .replace("</cmd>", reset)
        .replace("<group>", group)
        .replace("</group>", reset)
        .replace("<err>", err)
        .replace("</err>", reset)
        .replace("<dim>", dim)
        .replace("</dim>", reset);

    Box::leak(formatted_string.into_boxed_str())
}

/// prm: cascading per-directory settings and reproducible command runs.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    help_template = { build_help_string() },
    disable_help_subcommand = true,
    trailing_var_arg = true
)]
pub struct Cli {
    /// The command followed by its own arguments. Each command parses the
    /// rest itself.
    #[arg()]
    pub args: Vec<String>,
}
