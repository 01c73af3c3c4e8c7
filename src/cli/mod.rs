//! CLI command handlers

#[cfg(feature = "postgres")]
pub mod analytics_command;
pub mod events;
pub mod workflow_generator;
pub mod yaml_migrator;
pub mod yaml_validator;
