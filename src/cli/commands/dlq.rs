//! Dead Letter Queue command implementation
//!
//! This module handles DLQ management for failed MapReduce items.

use crate::cli::args::DlqCommands;
use anyhow::Result;

/// Execute DLQ-related commands
pub async fn run_dlq_command(command: DlqCommands) -> Result<()> {
    // TODO: Extract implementation from main.rs
    Err(anyhow::anyhow!(
        "DLQ command implementation not yet extracted from main.rs"
    ))
}
