// src/cli/handlers/mod.rs

// One module per CLI command.

pub mod commands;
pub mod commons;
pub mod context;
pub mod history;
pub mod init;
pub mod project;
pub mod run;
