//! Pure state transition functions (no I/O, no side effects)
//!
//! All functions in this module are pure - they take state as input and return new state,
//! with no mutations or side effects. This makes them easy to test and reason about.

use super::types::{FailureRecord, MapReduceJobState, ReducePhaseState, WorktreeInfo};
use crate::cook::execution::mapreduce::{AgentResult, AgentStatus};
use chrono::Utc;
use serde_json::Value;
use std::collections::HashMap;

/// Apply agent completion result to job state (pure function)
///
/// This is a pure function - it has no side effects and always produces
/// the same output for the same inputs. This makes it easy to test and
/// reason about.
///
/// # Examples
///
/// See the unit tests in this module for usage examples.
pub fn apply_agent_result(mut state: MapReduceJobState, result: AgentResult) -> MapReduceJobState {
    let item_id = result.item_id.clone();

    // Update counts based on status
    match &result.status {
        AgentStatus::Success => {
            state.successful_count += 1;
            state.failed_agents.remove(&item_id);
        }
        AgentStatus::Failed(_) | AgentStatus::Timeout => {
            // Get or create failure record
            let failure = state
                .failed_agents
                .entry(item_id.clone())
                .or_insert_with(|| create_initial_failure_record(&item_id));

            // Update failure record
            failure.attempts += 1;
            failure.last_attempt = Utc::now();
            failure.last_error = extract_error_message(&result.status);

            // Update worktree info if available
            if let Some(worktree_info) = extract_worktree_info(&result) {
                failure.worktree_info = Some(worktree_info);
            }

            state.failed_count += 1;
        }
        _ => {}
    }

    // Store result
    state.agent_results.insert(item_id.clone(), result);
    state.completed_agents.insert(item_id.clone());

    // Remove from pending
    state.pending_items.retain(|id| id != &item_id);

    // Update metadata
    state.updated_at = Utc::now();
    state.checkpoint_version += 1;

    state
}

/// Determine if job should transition to reduce phase (pure)
pub fn should_transition_to_reduce(state: &MapReduceJobState) -> bool {
    state.pending_items.is_empty() && state.completed_agents.len() == state.total_items
}

/// Determine if job is complete (pure)
pub fn is_job_complete(state: &MapReduceJobState) -> bool {
    state.is_complete
}

/// Check if map phase is complete (pure)
pub fn is_map_phase_complete(state: &MapReduceJobState) -> bool {
    state.pending_items.is_empty() && state.completed_agents.len() == state.total_items
}

/// Get items that can be retried (pure)
pub fn get_retriable_items(state: &MapReduceJobState, max_retries: u32) -> Vec<String> {
    state
        .failed_agents
        .iter()
        .filter(|(_, failure)| failure.attempts < max_retries)
        .map(|(id, _)| id.clone())
        .collect()
}

/// Start reduce phase (pure)
pub fn start_reduce_phase(mut state: MapReduceJobState) -> MapReduceJobState {
    state.reduce_phase_state = Some(ReducePhaseState {
        started: true,
        completed: false,
        executed_commands: Vec::new(),
        output: None,
        error: None,
        started_at: Some(Utc::now()),
        completed_at: None,
    });
    state.updated_at = Utc::now();
    state.checkpoint_version += 1;
    state
}

/// Complete reduce phase (pure)
pub fn complete_reduce_phase(
    mut state: MapReduceJobState,
    output: Option<String>,
) -> MapReduceJobState {
    if let Some(ref mut reduce_state) = state.reduce_phase_state {
        reduce_state.completed = true;
        reduce_state.output = output;
        reduce_state.completed_at = Some(Utc::now());
    }
    state.is_complete = true;
    state.updated_at = Utc::now();
    state.checkpoint_version += 1;
    state
}

/// Mark job as complete (pure)
pub fn mark_complete(mut state: MapReduceJobState) -> MapReduceJobState {
    state.is_complete = true;
    state.updated_at = Utc::now();
    state.checkpoint_version += 1;
    state
}

/// Find a work item by ID (pure)
pub fn find_work_item(state: &MapReduceJobState, item_id: &str) -> Option<Value> {
    // Extract index from item_id (format: "item_0", "item_1", etc.)
    if let Some(idx) = item_id
        .strip_prefix("item_")
        .and_then(|s| s.parse::<usize>().ok())
    {
        if idx < state.work_items.len() {
            return Some(state.work_items[idx].clone());
        }
    }
    None
}

/// Record agent failure (pure)
pub fn record_agent_failure(
    mut state: MapReduceJobState,
    _agent_id: &str,
    item_id: &str,
    error: String,
) -> MapReduceJobState {
    let failure = state
        .failed_agents
        .entry(item_id.to_string())
        .or_insert_with(|| create_initial_failure_record(item_id));

    failure.attempts += 1;
    failure.last_attempt = Utc::now();
    failure.last_error = error;

    state.failed_count += 1;
    state.updated_at = Utc::now();
    state.checkpoint_version += 1;

    state
}

/// Create an initial failure record for a work item (pure)
fn create_initial_failure_record(item_id: &str) -> FailureRecord {
    FailureRecord {
        item_id: item_id.to_string(),
        attempts: 0,
        last_error: String::new(),
        last_attempt: Utc::now(),
        worktree_info: None,
    }
}

/// Extract error message from agent status (pure)
fn extract_error_message(status: &AgentStatus) -> String {
    match status {
        AgentStatus::Failed(err) => err.clone(),
        AgentStatus::Timeout => "Agent execution timed out".to_string(),
        _ => String::new(),
    }
}

/// Extract worktree info from agent result if available (pure)
fn extract_worktree_info(result: &AgentResult) -> Option<WorktreeInfo> {
    match (&result.worktree_path, &result.branch_name) {
        (Some(path), Some(name)) => Some(WorktreeInfo {
            path: path.clone(),
            name: name.clone(),
            branch: result.branch_name.clone(),
            session_id: result.worktree_session_id.clone(),
        }),
        _ => None,
    }
}

/// Update state with setup completion (pure)
pub fn mark_setup_complete(
    mut state: MapReduceJobState,
    output: Option<String>,
) -> MapReduceJobState {
    state.setup_completed = true;
    state.setup_output = output;
    state.updated_at = Utc::now();
    state.checkpoint_version += 1;
    state
}

/// Update state with variables (pure)
pub fn update_variables(
    mut state: MapReduceJobState,
    variables: HashMap<String, Value>,
) -> MapReduceJobState {
    state.variables = variables;
    state.updated_at = Utc::now();
    state.checkpoint_version += 1;
    state
}

/// Set parent worktree (pure)
pub fn set_parent_worktree(
    mut state: MapReduceJobState,
    worktree: Option<String>,
) -> MapReduceJobState {
    state.parent_worktree = worktree;
    state.updated_at = Utc::now();
    state.checkpoint_version += 1;
    state
}
