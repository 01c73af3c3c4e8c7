//! Exec command implementation
//!
//! This module handles the execution of single commands with retry support.

use anyhow::Result;
use std::path::PathBuf;

/// Execute a single command with retry support
pub async fn run_exec_command(
    command: String,
    retry: u32,
    timeout: Option<u64>,
    path: Option<PathBuf>,
) -> Result<()> {
    // TODO: Extract implementation from main.rs
    Err(anyhow::anyhow!(
        "Exec command implementation not yet extracted from main.rs"
    ))
}

/// Execute a batch of commands on multiple files
pub async fn run_batch_command(
    pattern: String,
    command: String,
    parallel: usize,
    retry: Option<u32>,
    timeout: Option<u64>,
    path: Option<PathBuf>,
) -> Result<()> {
    // TODO: Extract implementation from main.rs
    Err(anyhow::anyhow!(
        "Batch command implementation not yet extracted from main.rs"
    ))
}
