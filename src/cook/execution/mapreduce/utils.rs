//! Pure utility functions for MapReduce operations
//!
//! This module contains pure functions extracted from the main MapReduce executor
//! to improve testability, maintainability, and functional programming practices.

use crate::cook::execution::interpolation::InterpolationContext;
use crate::cook::execution::mapreduce::{AgentResult, AgentStatus};
use serde_json::json;
use std::collections::HashMap;

/// Summary statistics for map results
#[derive(Debug, Clone, PartialEq)]
pub struct MapResultSummary {
    pub successful: usize,
    pub failed: usize,
    pub total: usize,
}

/// Agent status enumeration for classification
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AgentEventType {
    Completed,
    Failed,
    TimedOut,
    Retrying,
    InProgress,
}

// ============================================================================
// Result Aggregation Functions
// ============================================================================

/// Calculate summary statistics from map results (pure function)
///
/// # Arguments
/// * `map_results` - Collection of agent results to summarize
///
/// # Returns
/// Summary containing counts of successful, failed, and total agents
pub fn calculate_map_result_summary(map_results: &[AgentResult]) -> MapResultSummary {
    let successful = map_results
        .iter()
        .filter(|r| matches!(r.status, AgentStatus::Success))
        .count();

    let failed = map_results
        .iter()
        .filter(|r| matches!(r.status, AgentStatus::Failed(_) | AgentStatus::Timeout))
        .count();

    MapResultSummary {
        successful,
        failed,
        total: map_results.len(),
    }
}

/// Build InterpolationContext with map results (pure function)
///
/// # Arguments
/// * `map_results` - Collection of agent results
/// * `summary` - Pre-calculated summary statistics
///
/// # Returns
/// InterpolationContext populated with map results and statistics
pub fn build_map_results_interpolation_context(
    map_results: &[AgentResult],
    summary: &MapResultSummary,
) -> Result<InterpolationContext, serde_json::Error> {
    let mut context = InterpolationContext::new();

    // Add summary statistics
    context.set(
        "map",
        json!({
            "successful": summary.successful,
            "failed": summary.failed,
            "total": summary.total
        }),
    );

    // Add complete results as JSON value
    let results_value = serde_json::to_value(map_results)?;
    context.set("map.results", results_value);

    // Add individual result access
    for (index, result) in map_results.iter().enumerate() {
        let result_value = serde_json::to_value(result)?;
        context.set(format!("results[{}]", index), result_value);
    }

    Ok(context)
}

// ============================================================================
// Variable Transformation Functions
// ============================================================================

/// Build AgentContext variables for shell commands (pure function)
///
/// # Arguments
/// * `map_results` - Collection of agent results
/// * `summary` - Pre-calculated summary statistics
///
/// # Returns
/// HashMap of variable names to string values for shell command substitution
pub fn build_agent_context_variables(
    map_results: &[AgentResult],
    summary: &MapResultSummary,
) -> Result<HashMap<String, String>, serde_json::Error> {
    let mut variables = HashMap::new();

    // Add summary statistics as strings for shell command substitution
    variables.insert("map.successful".to_string(), summary.successful.to_string());
    variables.insert("map.failed".to_string(), summary.failed.to_string());
    variables.insert("map.total".to_string(), summary.total.to_string());

    // Add complete results as JSON string for complex access patterns
    let results_json = serde_json::to_string(map_results)?;
    variables.insert("map.results_json".to_string(), results_json.clone());
    variables.insert("map.results".to_string(), results_json);

    // Add individual result summaries for easier access in shell commands
    for (index, result) in map_results.iter().enumerate() {
        add_individual_result_variables(&mut variables, index, result);
    }

    Ok(variables)
}

/// Add variables for a single agent result (pure function)
///
/// # Arguments
/// * `variables` - HashMap to populate with result variables
/// * `index` - Index of the result in the collection
/// * `result` - Individual agent result to process
pub fn add_individual_result_variables(
    variables: &mut HashMap<String, String>,
    index: usize,
    result: &AgentResult,
) {
    // Add basic result info
    variables.insert(format!("result.{}.item_id", index), result.item_id.clone());

    let status_string = match &result.status {
        AgentStatus::Success => "success".to_string(),
        AgentStatus::Failed(err) => format!("failed: {}", err),
        AgentStatus::Timeout => "timeout".to_string(),
        AgentStatus::Pending => "pending".to_string(),
        AgentStatus::Running => "running".to_string(),
        AgentStatus::Retrying(attempt) => format!("retrying: {}", attempt),
    };
    variables.insert(format!("result.{}.status", index), status_string);

    // Add output if available (truncated for safety)
    if let Some(ref output) = result.output {
        let truncated_output = truncate_output(output, 500);
        variables.insert(format!("result.{}.output", index), truncated_output);
    }

    // Add commit count
    variables.insert(
        format!("result.{}.commits", index),
        result.commits.len().to_string(),
    );
}

// ============================================================================
// ID Generation Functions
// ============================================================================

/// Generate agent ID from index and item ID (pure function)
///
/// # Arguments
/// * `agent_index` - Numeric index of the agent
/// * `item_id` - Unique identifier for the work item
///
/// # Returns
/// Formatted agent ID string
pub fn generate_agent_id(agent_index: usize, item_id: &str) -> String {
    format!("agent-{}-{}", agent_index, item_id)
}

/// Generate branch name for an agent (pure function)
///
/// # Arguments
/// * `session_id` - Session identifier for the MapReduce job
/// * `item_id` - Unique identifier for the work item
///
/// # Returns
/// Formatted git branch name
pub fn generate_agent_branch_name(session_id: &str, item_id: &str) -> String {
    format!("prodigy-agent-{}-{}", session_id, item_id)
}

// ============================================================================
// Error Classification Functions
// ============================================================================

/// Classify agent status for event logging (pure function)
///
/// # Arguments
/// * `status` - Agent status to classify
///
/// # Returns
/// Corresponding event type for the status
pub fn classify_agent_status(status: &AgentStatus) -> AgentEventType {
    match status {
        AgentStatus::Success => AgentEventType::Completed,
        AgentStatus::Failed(_) => AgentEventType::Failed,
        AgentStatus::Timeout => AgentEventType::TimedOut,
        AgentStatus::Retrying(_) => AgentEventType::Retrying,
        _ => AgentEventType::InProgress,
    }
}

// ============================================================================
// Text Processing Functions
// ============================================================================

/// Truncate output to safe length (pure function)
///
/// # Arguments
/// * `output` - Text to potentially truncate
/// * `max_length` - Maximum allowed length
///
/// # Returns
/// Truncated string with indicator if truncation occurred
pub fn truncate_output(output: &str, max_length: usize) -> String {
    if output.len() > max_length {
        format!("{}...[truncated]", &output[..max_length])
    } else {
        output.to_string()
    }
}

/// Truncate command for display (pure function)
///
/// # Arguments
/// * `cmd` - Command string to truncate
/// * `max_len` - Maximum display length
///
/// # Returns
/// Truncated command suitable for display
pub fn truncate_command(cmd: &str, max_len: usize) -> String {
    if cmd.len() <= max_len {
        cmd.to_string()
    } else {
        format!("{}...", &cmd[..max_len - 3])
    }
}

// ============================================================================
// Tests
// ============================================================================
