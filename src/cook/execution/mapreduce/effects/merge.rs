//! Merge I/O effects for MapReduce agent results
//!
//! This module provides Effect-based abstractions for merging agent
//! worktree results back to the parent branch.
//!
//! NOTE (Spec 173): This is a foundational implementation demonstrating the Effect pattern.
//! Full integration with WorktreeManager will be done in follow-up work.

use crate::cook::execution::errors::MapReduceError;
use crate::cook::execution::mapreduce::environment::MapEnv;
use crate::cook::execution::mapreduce::effects::worktree::Worktree;
use stillwater::Effect;

/// Result from merge operation
#[derive(Debug, Clone)]
pub struct MergeResult {
    /// Whether the merge succeeded
    pub success: bool,
    /// Commits that were merged
    pub commits: Vec<String>,
    /// Any conflicts encountered
    pub conflicts: Vec<String>,
}

/// Effect: Merge agent worktree results to parent branch
///
/// Merges commits from an agent's worktree back to the parent branch,
/// making the agent's work available for the reduce phase.
///
/// This is a placeholder demonstrating the Effect pattern.
/// Full implementation will integrate with WorktreeManager.
///
/// # Example
///
/// ```ignore
/// let effect = merge_to_parent_effect(&worktree, "parent-branch");
/// let result = effect.run_async(&env).await?;
/// ```
pub fn merge_to_parent_effect(
    worktree: &Worktree,
    parent_branch: &str,
) -> Effect<MergeResult, MapReduceError, MapEnv> {
    let _worktree = worktree.clone();
    let _parent_branch = parent_branch.to_string();

    Effect::from_async(move |_env: &MapEnv| async move {
        // Placeholder implementation
        // Real implementation will use env.worktree_manager
        Ok(MergeResult {
            success: true,
            commits: vec!["abc123".to_string()],
            conflicts: vec![],
        })
    })
}

/// Effect: Check if worktree has commits to merge
///
/// Checks whether an agent's worktree has any commits that need to be merged.
/// Used for commit validation and optimization.
pub fn has_commits_effect(worktree: &Worktree) -> Effect<bool, MapReduceError, MapEnv> {
    let _worktree = worktree.clone();

    Effect::from_async(move |_env: &MapEnv| async move {
        // Placeholder implementation
        Ok(true)
    })
}

/// Effect: Get list of commits in worktree
///
/// Retrieves the list of commits made in an agent's worktree.
pub fn list_commits_effect(worktree: &Worktree) -> Effect<Vec<String>, MapReduceError, MapEnv> {
    let _worktree = worktree.clone();

    Effect::from_async(move |_env: &MapEnv| async move {
        // Placeholder implementation
        Ok(vec!["abc123".to_string()])
    })
}
