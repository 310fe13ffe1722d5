// src/core/mod.rs

pub mod command_repository;
pub mod config_resolver;
pub mod context_resolver;
pub mod execution_log;
pub mod interpolator;
pub mod project;
pub mod settings;
pub mod task_executor;

#[cfg(test)]
pub(crate) mod test_support;
