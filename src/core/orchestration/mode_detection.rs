//! Mode detection for workflow execution
//!
//! This module provides pure functions for detecting the execution mode
//! from workflow configuration. No I/O operations are performed.

use crate::cook::command::CookCommand;
use crate::cook::orchestrator::CookConfig;

/// Execution modes for workflow processing
///
/// Each mode determines how the workflow will be executed:
/// - Standard: Sequential command execution
/// - MapReduce: Parallel execution across work items
/// - Iterative: Sequential execution with arguments
/// - DryRun: Preview without actual execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExecutionMode {
    /// Standard sequential execution
    #[default]
    Standard,
    /// MapReduce parallel execution with work items
    MapReduce,
    /// Iterative execution with arguments or file mappings
    Iterative,
    /// Dry run mode - preview without execution
    DryRun,
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionMode::Standard => write!(f, "Standard"),
            ExecutionMode::MapReduce => write!(f, "MapReduce"),
            ExecutionMode::Iterative => write!(f, "Iterative"),
            ExecutionMode::DryRun => write!(f, "DryRun"),
        }
    }
}

/// Pure: Detect execution mode from cook configuration
///
/// Mode priority (highest to lowest):
/// 1. DryRun - if dry_run flag is set
/// 2. MapReduce - if mapreduce_config is present
/// 3. Iterative - if args or map patterns are provided
/// 4. Standard - default mode
///
/// # Arguments
///
/// * `config` - The cook configuration to analyze
///
/// # Returns
///
/// The detected execution mode
///
/// # Example
///
/// ```ignore
/// let config = CookConfig { /* ... */ };
/// let mode = detect_execution_mode(&config);
/// assert_eq!(mode, ExecutionMode::Standard);
/// ```
pub fn detect_execution_mode(config: &CookConfig) -> ExecutionMode {
    if config.command.dry_run {
        ExecutionMode::DryRun
    } else if config.mapreduce_config.is_some() {
        ExecutionMode::MapReduce
    } else if has_iteration_arguments(&config.command) {
        ExecutionMode::Iterative
    } else {
        ExecutionMode::Standard
    }
}

/// Pure: Check if the command has iteration arguments
///
/// Returns true if either args or map patterns are provided
fn has_iteration_arguments(command: &CookCommand) -> bool {
    !command.args.is_empty() || !command.map.is_empty()
}
