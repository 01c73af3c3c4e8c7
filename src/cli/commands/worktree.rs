//! Worktree command implementation
//!
//! This module handles git worktree management for parallel sessions.

use crate::cli::args::WorktreeCommands;
use anyhow::Result;

/// Execute worktree-related commands
pub async fn run_worktree_command(command: WorktreeCommands) -> Result<()> {
    // TODO: Extract implementation from main.rs
    Err(anyhow::anyhow!(
        "Worktree command implementation not yet extracted from main.rs"
    ))
}
