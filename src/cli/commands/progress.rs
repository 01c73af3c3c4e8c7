//! Progress command implementation
//!
//! This module handles MapReduce job progress viewing and monitoring.

use anyhow::Result;
use std::path::PathBuf;

/// View MapReduce job progress
pub async fn run_progress_command(
    _job_id: String,
    _export: Option<PathBuf>,
    _format: String,
    _web: Option<u16>,
) -> Result<()> {
    println!("Viewing MapReduce job progress...");
    Ok(())
}
