//! Command execution effects for MapReduce agents
//!
//! This module provides Effect-based abstractions for executing commands
//! within agent worktrees.
//!
//! NOTE (Spec 173): This is a foundational implementation demonstrating the Effect pattern.
//! Full integration with AgentCommandExecutor will be done in follow-up work.

use crate::cook::execution::errors::MapReduceError;
use crate::cook::execution::mapreduce::environment::MapEnv;
use crate::cook::execution::mapreduce::effects::worktree::Worktree;
use serde_json::Value;
use std::collections::HashMap;
use stillwater::Effect;

/// Result from command execution
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// The worktree where commands were executed
    pub worktree: Worktree,
    /// Variables after command execution
    pub variables: HashMap<String, Value>,
    /// Output from commands
    pub output: Vec<String>,
}

/// Effect: Execute agent template commands in worktree
///
/// Runs the agent template commands within the specified worktree,
/// with the work item data available as variables.
///
/// This is a placeholder demonstrating the Effect pattern.
/// Full implementation will integrate with AgentCommandExecutor.
///
/// # Example
///
/// ```ignore
/// let item = json!({"id": 1, "task": "process"});
/// let effect = execute_commands_effect(&item, &worktree);
/// let result = effect.run_async(&env).await?;
/// ```
pub fn execute_commands_effect(
    item: &Value,
    worktree: &Worktree,
) -> Effect<CommandResult, MapReduceError, MapEnv> {
    let item = item.clone();
    let worktree = worktree.clone();

    Effect::from_async(move |_env: &MapEnv| {
        let item = item.clone();
        let worktree = worktree.clone();

        async move {
            // Placeholder implementation
            // Real implementation will use env.command_executor
            let mut variables = HashMap::new();
            variables.insert("item".to_string(), item.clone());

            Ok(CommandResult {
                worktree,
                variables,
                output: vec!["Command executed".to_string()],
            })
        }
    })
}
