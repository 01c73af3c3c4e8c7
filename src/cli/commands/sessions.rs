//! Sessions command implementation
//!
//! This module handles session management commands.

use crate::cli::args::SessionCommands;
use anyhow::Result;

/// Execute session-related commands
pub async fn run_sessions_command(command: SessionCommands) -> Result<()> {
    // TODO: Extract implementation from main.rs
    Err(anyhow::anyhow!(
        "Sessions command implementation not yet extracted from main.rs"
    ))
}
