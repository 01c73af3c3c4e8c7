//! Goal-seeking command implementation
//!
//! This module handles goal-seeking operations with iterative refinement.

use anyhow::Result;
use std::path::PathBuf;

/// Parameters for goal-seeking operation
pub struct GoalSeekParams {
    pub goal: String,
    pub command: String,
    pub validate: String,
    pub threshold: u32,
    pub max_attempts: u32,
    pub timeout: Option<u64>,
    pub fail_on_incomplete: bool,
    pub path: Option<PathBuf>,
}

/// Execute goal-seeking operation with iterative refinement
pub async fn run_goal_seek(params: GoalSeekParams) -> Result<()> {
    // TODO: Extract implementation from main.rs
    Err(anyhow::anyhow!(
        "Goal-seek implementation not yet extracted from main.rs"
    ))
}
