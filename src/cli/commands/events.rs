//! Events command implementation
//!
//! This module handles event viewing and management for MapReduce operations.

use crate::cli::args::EventCommands;
use anyhow::Result;

/// Execute events-related commands
pub async fn run_events_command(command: EventCommands) -> Result<()> {
    // TODO: Extract implementation from main.rs
    Err(anyhow::anyhow!(
        "Events command implementation not yet extracted from main.rs"
    ))
}
