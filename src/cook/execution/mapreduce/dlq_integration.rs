//! DLQ Integration for MapReduce Agent Failures
//!
//! This module provides pure functions to convert AgentResult failures into
//! DeadLetteredItems for the Dead Letter Queue (DLQ). All functions are pure
//! (no I/O) and fully testable.

use crate::cook::execution::dlq::{DeadLetteredItem, ErrorType, FailureDetail, WorktreeArtifacts};
use crate::cook::execution::mapreduce::agent::types::{AgentResult, AgentStatus};
use chrono::Utc;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Convert an AgentResult to a DeadLetteredItem for DLQ insertion
///
/// Returns Some(DeadLetteredItem) for failed/timeout agents, None for successful agents.
///
/// # Arguments
///
/// * `result` - The agent execution result
/// * `work_item` - The original work item data
/// * `attempt_number` - The attempt number for this execution
///
/// # Example
///
/// ```
/// use prodigy::cook::execution::mapreduce::dlq_integration::agent_result_to_dlq_item;
/// use prodigy::cook::execution::mapreduce::agent::types::{AgentResult, AgentStatus};
/// use serde_json::json;
/// use std::time::Duration;
///
/// let result = AgentResult {
///     item_id: "item-1".to_string(),
///     status: AgentStatus::Failed("test error".to_string()),
///     output: None,
///     commits: vec![],
///     files_modified: vec![],
///     duration: Duration::from_secs(10),
///     error: Some("test error".to_string()),
///     worktree_path: None,
///     branch_name: None,
///     worktree_session_id: None,
///     json_log_location: Some("/path/to/log.json".to_string()),
///     cleanup_status: None,
/// };
/// let work_item = json!({"id": 1, "data": "test"});
///
/// let dlq_item = agent_result_to_dlq_item(&result, &work_item, 1);
/// assert!(dlq_item.is_some());
/// ```
pub fn agent_result_to_dlq_item(
    result: &AgentResult,
    work_item: &Value,
    attempt_number: u32,
) -> Option<DeadLetteredItem> {
    match &result.status {
        AgentStatus::Failed(error_msg) => Some(create_dlq_item_from_failure(
            result,
            work_item,
            error_msg,
            attempt_number,
        )),
        AgentStatus::Timeout => {
            let error_msg = "Agent execution timed out";
            Some(create_dlq_item_from_failure(
                result,
                work_item,
                error_msg,
                attempt_number,
            ))
        }
        _ => None, // Success, Running, Pending, Retrying - don't add to DLQ
    }
}

/// Create a DeadLetteredItem from a failed AgentResult
fn create_dlq_item_from_failure(
    result: &AgentResult,
    work_item: &Value,
    error_msg: &str,
    attempt_number: u32,
) -> DeadLetteredItem {
    DeadLetteredItem {
        item_id: result.item_id.clone(),
        item_data: work_item.clone(),
        first_attempt: Utc::now(),
        last_attempt: Utc::now(),
        failure_count: 1,
        failure_history: vec![create_failure_detail(result, error_msg, attempt_number)],
        error_signature: create_error_signature(error_msg),
        worktree_artifacts: extract_worktree_artifacts(result),
        reprocess_eligible: is_reprocessable(&result.status, error_msg),
        manual_review_required: requires_manual_review(error_msg),
    }
}

/// Create a FailureDetail from an AgentResult
fn create_failure_detail(result: &AgentResult, error_msg: &str, attempt: u32) -> FailureDetail {
    FailureDetail {
        attempt_number: attempt,
        timestamp: Utc::now(),
        error_type: classify_error(&result.status, error_msg),
        error_message: error_msg.to_string(),
        stack_trace: result.error.clone(),
        agent_id: format!("agent-{}", result.item_id),
        step_failed: "agent_execution".to_string(),
        duration_ms: result.duration.as_millis() as u64,
        json_log_location: result.json_log_location.clone(),
    }
}

/// Create a consistent error signature for pattern analysis
///
/// Uses SHA256 hash of error message, truncated to 16 characters for brevity
fn create_error_signature(error_msg: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(error_msg.as_bytes());
    let hash = hasher.finalize();
    format!("{:x}", hash)[..16].to_string()
}

/// Classify error type based on status and message content
fn classify_error(status: &AgentStatus, error_msg: &str) -> ErrorType {
    match status {
        AgentStatus::Timeout => ErrorType::Timeout,
        AgentStatus::Failed(_) => {
            let msg_lower = error_msg.to_lowercase();
            if msg_lower.contains("timeout") || msg_lower.contains("timed out") {
                ErrorType::Timeout
            } else if msg_lower.contains("merge") || msg_lower.contains("conflict") {
                ErrorType::MergeConflict
            } else if msg_lower.contains("worktree") {
                ErrorType::WorktreeError
            } else if msg_lower.contains("validation") || msg_lower.contains("invalid") {
                ErrorType::ValidationFailed
            } else if msg_lower.contains("resource") || msg_lower.contains("out of memory") {
                ErrorType::ResourceExhausted
            } else {
                // Extract exit code if present in error message
                if let Some(exit_code) = extract_exit_code(error_msg) {
                    ErrorType::CommandFailed { exit_code }
                } else {
                    ErrorType::Unknown
                }
            }
        }
        _ => ErrorType::Unknown,
    }
}

/// Extract exit code from error message if present
fn extract_exit_code(error_msg: &str) -> Option<i32> {
    // Try to find patterns like "exit code: 1" or "exited with code 127"
    let patterns = [
        regex::Regex::new(r"exit code:?\s*(\d+)").ok()?,
        regex::Regex::new(r"exited with code\s*(\d+)").ok()?,
        regex::Regex::new(r"status code:?\s*(\d+)").ok()?,
    ];

    for pattern in &patterns {
        if let Some(captures) = pattern.captures(error_msg) {
            if let Some(code_str) = captures.get(1) {
                if let Ok(code) = code_str.as_str().parse::<i32>() {
                    return Some(code);
                }
            }
        }
    }

    None
}

/// Extract worktree artifacts from AgentResult
fn extract_worktree_artifacts(result: &AgentResult) -> Option<WorktreeArtifacts> {
    result.worktree_path.as_ref().map(|path| WorktreeArtifacts {
        worktree_path: path.clone(),
        branch_name: result.branch_name.clone().unwrap_or_default(),
        uncommitted_changes: None, // Would require filesystem I/O to detect
        error_logs: None,          // Would require filesystem I/O to read
    })
}

/// Determine if the failure is eligible for reprocessing
fn is_reprocessable(status: &AgentStatus, error_msg: &str) -> bool {
    match status {
        // Timeouts are generally reprocessable
        AgentStatus::Timeout => true,
        // Failed agents might be reprocessable depending on error type
        AgentStatus::Failed(_) => {
            let msg_lower = error_msg.to_lowercase();
            // Transient errors are reprocessable
            msg_lower.contains("timeout")
                || msg_lower.contains("network")
                || msg_lower.contains("temporary")
                || msg_lower.contains("rate limit")
                || msg_lower.contains("resource")
        }
        // Other statuses are not in DLQ
        _ => false,
    }
}

/// Determine if manual review is required
fn requires_manual_review(error_msg: &str) -> bool {
    let msg_lower = error_msg.to_lowercase();
    // Permission errors and critical failures need manual review
    msg_lower.contains("permission")
        || msg_lower.contains("access denied")
        || msg_lower.contains("critical")
        || msg_lower.contains("fatal")
        || msg_lower.contains("corrupted")
        || msg_lower.contains("validation")
}
