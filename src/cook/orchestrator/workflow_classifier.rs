//! Workflow classification and normalization
//!
//! Pure functions for classifying workflow types and converting between formats.
//! These functions have no side effects and can be easily tested.

use crate::config::command::WorkflowCommand;

use super::core::{CookConfig, WorkflowType};

/// Classify the workflow type based on configuration
pub(crate) fn classify_workflow_type(config: &CookConfig) -> WorkflowType {
    // MapReduce takes precedence
    if config.mapreduce_config.is_some() {
        return WorkflowType::MapReduce;
    }

    // Check for structured commands with outputs
    let has_structured_outputs = config.workflow.commands.iter().any(|cmd| {
        matches!(cmd, WorkflowCommand::Structured(c)
            if c.outputs.is_some())
    });

    if has_structured_outputs {
        return WorkflowType::StructuredWithOutputs;
    }

    // Check for args or map parameters
    if !config.command.args.is_empty() || !config.command.map.is_empty() {
        return WorkflowType::WithArguments;
    }

    WorkflowType::Standard
}

/// Determine if a command requires a commit
pub fn determine_commit_required(
    cmd: &WorkflowCommand,
    command: &crate::config::command::Command,
) -> bool {
    match cmd {
        WorkflowCommand::SimpleObject(simple) => {
            // If explicitly set in YAML, use that value
            if let Some(cr) = simple.commit_required {
                cr
            } else if crate::config::command_validator::COMMAND_REGISTRY
                .get(&command.name)
                .is_some()
            {
                // Command is in registry, use its configured default
                command.metadata.commit_required
            } else {
                // Command not in registry, use WorkflowStep's default
                true
            }
        }
        WorkflowCommand::Structured(_) => {
            // Structured commands already have metadata
            command.metadata.commit_required
        }
        _ => {
            // For string commands, check registry or use WorkflowStep default
            if crate::config::command_validator::COMMAND_REGISTRY
                .get(&command.name)
                .is_some()
            {
                command.metadata.commit_required
            } else {
                true
            }
        }
    }
}

/// Simple glob pattern matching for file filtering
pub fn matches_glob_pattern(file: &str, pattern: &str) -> bool {
    // Simple glob matching for common cases
    if pattern == "*" {
        return true;
    }

    // Handle patterns like "*.md" or "*test*"
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 2 {
        let prefix = parts[0];
        let suffix = parts[1];
        let filename = file.split('/').next_back().unwrap_or(file);
        return filename.starts_with(prefix) && filename.ends_with(suffix);
    }

    false
}
