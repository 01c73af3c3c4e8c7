//! Presentation layer for worktree commands
//!
//! This module contains pure functions that format data for display.
//! All functions are pure: they take data and return formatted strings
//! without performing I/O directly.

use crate::worktree::WorktreeSession;

use super::operations::{BatchMergeResult, MergeResult};

/// Format a list of sessions as a table
#[allow(dead_code)] // Used in Phase 5
pub fn format_sessions_table(sessions: &[WorktreeSession]) -> String {
    if sessions.is_empty() {
        return "No active Prodigy worktrees found.".to_string();
    }

    let mut output = String::new();
    output.push_str("Active Prodigy worktrees:\n");
    output.push_str(&format!(
        "{:<40} {:<30} {:<20}\n",
        "Name", "Branch", "Created"
    ));
    output.push_str(&format!("{}\n", "-".repeat(90)));

    for session in sessions {
        output.push_str(&format!(
            "{:<40} {:<30} {:<20}\n",
            session.name,
            session.branch,
            session.created_at.format("%Y-%m-%d %H:%M:%S")
        ));
    }

    output
}

/// Format a merge result message
#[allow(dead_code)] // Used in Phase 5
pub fn format_merge_result(result: &MergeResult) -> String {
    if result.success {
        format!("✅ Successfully merged worktree '{}'", result.session_name)
    } else {
        format!(
            "❌ Failed to merge worktree '{}': {}",
            result.session_name,
            result
                .error
                .as_ref()
                .unwrap_or(&"Unknown error".to_string())
        )
    }
}

/// Format batch merge summary
#[allow(dead_code)] // Used in Phase 5
pub fn format_batch_merge_summary(result: &BatchMergeResult) -> String {
    if result.merged_count > 0 {
        format!("Successfully merged {} worktree(s)", result.merged_count)
    } else {
        "No worktrees were merged.".to_string()
    }
}

/// Format cleanup summary message
#[allow(dead_code)] // Used in Phase 5
pub fn format_cleanup_summary(cleaned_count: usize, dry_run: bool) -> String {
    if dry_run {
        format!("DRY RUN: Would clean {} worktree(s)", cleaned_count)
    } else {
        format!("Cleaned {} old worktrees", cleaned_count)
    }
}

/// Format session removal message
#[allow(dead_code)] // Used in Phase 5
pub fn format_session_removal(session_name: &str, dry_run: bool) -> String {
    if dry_run {
        format!("DRY RUN: Would remove worktree: {}", session_name)
    } else {
        format!("Removing worktree: {}", session_name)
    }
}

/// Format old worktree removal message
#[allow(dead_code)] // Used in Phase 5
pub fn format_old_worktree_removal(session_name: &str, age_hours: i64, dry_run: bool) -> String {
    if dry_run {
        format!(
            "DRY RUN: Would remove worktree '{}' (age: {} hours)",
            session_name, age_hours
        )
    } else {
        format!(
            "Removing old worktree '{}' (age: {} hours)",
            session_name, age_hours
        )
    }
}
