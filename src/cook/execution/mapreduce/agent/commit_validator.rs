//! Commit validation for MapReduce agent execution
//!
//! This module provides commit validation functionality for MapReduce agents,
//! ensuring that commands with `commit_required: true` actually create git commits.
//! Validation happens in the agent's isolated worktree to ensure correctness
//! across parallel execution.

use crate::abstractions::git::GitOperations;
use crate::cook::error::ResultExt;
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

/// Result of commit validation
#[derive(Debug, Clone, PartialEq)]
pub enum CommitValidationResult {
    /// Commits were created
    Valid { commits: Vec<CommitInfo> },
    /// No commits were created
    NoCommits,
}

/// Information about a commit
#[derive(Debug, Clone, PartialEq)]
pub struct CommitInfo {
    /// Commit SHA
    pub sha: String,
    /// Commit message (first line)
    pub message: String,
}

/// Validates that commits were created when required
pub struct CommitValidator {
    git_ops: Arc<dyn GitOperations>,
}

impl CommitValidator {
    /// Create a new commit validator
    pub fn new(git_ops: Arc<dyn GitOperations>) -> Self {
        Self { git_ops }
    }

    /// Get the current HEAD SHA in a worktree
    pub async fn get_head(&self, worktree_path: &Path) -> Result<String> {
        let output = self
            .git_ops
            .git_command_in_dir(&["rev-parse", "HEAD"], "get HEAD", worktree_path)
            .await
            .context("Failed to get HEAD")
            .map_err(|e| anyhow::Error::msg(e.to_string()))?;

        if !output.status.success() {
            anyhow::bail!(
                "git rev-parse HEAD failed: {}",
                String::from_utf8_lossy(&output.stderr)
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Verify that commits were created between two HEAD references
    pub async fn verify_commits_created(
        &self,
        worktree_path: &Path,
        head_before: &str,
        head_after: &str,
    ) -> Result<CommitValidationResult> {
        // If HEADs are the same, no commits were created
        if head_before == head_after {
            return Ok(CommitValidationResult::NoCommits);
        }

        // Get commits between the two references
        let commits = self
            .get_commits_between(worktree_path, head_before, head_after)
            .await?;

        Ok(CommitValidationResult::Valid { commits })
    }

    /// Get list of commits between two references
    pub async fn get_commits_between(
        &self,
        worktree_path: &Path,
        from_ref: &str,
        to_ref: &str,
    ) -> Result<Vec<CommitInfo>> {
        let output = self
            .git_ops
            .git_command_in_dir(
                &[
                    "log",
                    "--format=%H%n%s",
                    &format!("{}..{}", from_ref, to_ref),
                ],
                "get commits",
                worktree_path,
            )
            .await
            .context("Failed to get commits")
            .map_err(|e| anyhow::Error::msg(e.to_string()))?;

        if !output.status.success() {
            anyhow::bail!(
                "git log failed: {}",
                String::from_utf8_lossy(&output.stderr)
            );
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let lines: Vec<&str> = stdout.lines().collect();

        // Parse commit info (format is: SHA\nMessage\nSHA\nMessage...)
        let mut commits = Vec::new();
        let mut i = 0;
        while i < lines.len() {
            if i + 1 < lines.len() {
                let sha = lines[i].trim().to_string();
                let message = lines[i + 1].trim().to_string();
                commits.push(CommitInfo { sha, message });
                i += 2;
            } else {
                // Odd number of lines, skip the last one
                break;
            }
        }

        Ok(commits)
    }
}
