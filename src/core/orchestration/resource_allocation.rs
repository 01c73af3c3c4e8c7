//! Resource allocation for workflow execution
//!
//! This module provides pure functions for calculating resource requirements
//! based on execution mode and configuration. No I/O operations are performed.

use super::mode_detection::ExecutionMode;
use crate::cook::orchestrator::CookConfig;

/// Memory estimate per parallel task (100MB)
const MEMORY_PER_PARALLEL_TASK: usize = 100_000_000;

/// Memory estimate per iteration (50MB)
const MEMORY_PER_ITERATION: usize = 50_000_000;

/// Disk space estimate per worktree (500MB)
const DISK_SPACE_PER_WORKTREE: usize = 500_000_000;

/// Resource requirements for workflow execution
///
/// Contains estimates for worktrees, memory, disk space, and concurrency limits.
/// These are planning estimates, not hard guarantees.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceRequirements {
    /// Number of worktrees required
    pub worktrees: usize,
    /// Estimated memory usage in bytes
    pub memory_estimate: usize,
    /// Estimated disk space usage in bytes
    pub disk_space: usize,
    /// Maximum number of concurrent commands
    pub max_concurrent_commands: usize,
}

impl ResourceRequirements {
    /// Create minimal resource requirements
    ///
    /// Used for Standard and DryRun modes that don't require
    /// special resource allocation.
    pub fn minimal() -> Self {
        Self {
            worktrees: 0,
            memory_estimate: 0,
            disk_space: 0,
            max_concurrent_commands: 1,
        }
    }

    /// Check if resources are within given limits
    pub fn fits_within(&self, max_worktrees: usize, max_memory: usize, max_disk: usize) -> bool {
        self.worktrees <= max_worktrees
            && self.memory_estimate <= max_memory
            && self.disk_space <= max_disk
    }
}

impl Default for ResourceRequirements {
    fn default() -> Self {
        Self::minimal()
    }
}

/// Pure: Calculate resource requirements from configuration and mode
///
/// # Arguments
///
/// * `config` - The cook configuration
/// * `mode` - The detected execution mode
///
/// # Returns
///
/// Resource requirements for the execution plan
///
/// # Resource Calculation Rules
///
/// - **MapReduce**: worktrees = max_parallel + 1 (for parent), high memory/disk
/// - **Iterative**: worktrees = 1, memory based on number of iterations
/// - **Standard/DryRun**: minimal resources
pub fn calculate_resources(config: &CookConfig, mode: &ExecutionMode) -> ResourceRequirements {
    match mode {
        ExecutionMode::MapReduce => calculate_mapreduce_resources(config),
        ExecutionMode::Iterative => calculate_iterative_resources(config),
        ExecutionMode::Standard | ExecutionMode::DryRun => ResourceRequirements::minimal(),
    }
}

/// Calculate resources for MapReduce execution
fn calculate_mapreduce_resources(config: &CookConfig) -> ResourceRequirements {
    let max_parallel = get_max_parallel(config);

    ResourceRequirements {
        worktrees: max_parallel + 1, // +1 for parent worktree
        memory_estimate: estimate_memory_for_parallel(max_parallel),
        disk_space: estimate_disk_space_for_worktrees(max_parallel + 1),
        max_concurrent_commands: max_parallel,
    }
}

/// Calculate resources for Iterative execution
fn calculate_iterative_resources(config: &CookConfig) -> ResourceRequirements {
    let iterations = calculate_iteration_count(config);

    ResourceRequirements {
        worktrees: 1, // Single worktree for iterative mode
        memory_estimate: estimate_memory_for_iterations(iterations),
        disk_space: 0, // Iterative mode reuses same worktree
        max_concurrent_commands: 1,
    }
}

/// Get max_parallel value from MapReduce config
///
/// Returns a default of 10 if not specified
fn get_max_parallel(config: &CookConfig) -> usize {
    config
        .mapreduce_config
        .as_ref()
        .map(|mr| {
            // Parse max_parallel as usize, defaulting to 10
            mr.map.max_parallel.parse::<usize>().unwrap_or(10)
        })
        .unwrap_or(10)
}

/// Calculate the number of iterations from config
fn calculate_iteration_count(config: &CookConfig) -> usize {
    let from_args = config.command.args.len();
    let from_map = config.command.map.len();

    // Use args count if provided, otherwise use map count
    // If neither, assume 1 iteration
    if from_args > 0 {
        from_args
    } else if from_map > 0 {
        from_map
    } else {
        1
    }
}

/// Estimate memory requirements for parallel execution
fn estimate_memory_for_parallel(max_parallel: usize) -> usize {
    max_parallel * MEMORY_PER_PARALLEL_TASK
}

/// Estimate memory requirements for iterative execution
fn estimate_memory_for_iterations(iterations: usize) -> usize {
    iterations * MEMORY_PER_ITERATION
}

/// Estimate disk space for worktrees
fn estimate_disk_space_for_worktrees(worktree_count: usize) -> usize {
    worktree_count * DISK_SPACE_PER_WORKTREE
}
