//! Pure functions for collecting work items from various sources in MapReduce resume.
//!
//! This module provides functional, side-effect-free helpers to collect work items
//! from pending items, failed items, and other sources. These functions operate on
//! immutable state and return new collections.

use crate::cook::execution::state::MapReduceJobState;
use serde_json::Value;

/// Collect pending items from job state.
///
/// Pure function that extracts pending work items without mutating state.
/// Items are returned in the order they appear in `pending_items`.
///
/// # Arguments
/// * `state` - Job state containing pending items
///
/// # Returns
/// Vector of work items that are still pending
///
/// # Examples
/// ```ignore
/// let pending = collect_pending_items(&state);
/// assert_eq!(pending.len(), 5);
/// ```
pub fn collect_pending_items(state: &MapReduceJobState) -> Vec<Value> {
    state
        .pending_items
        .iter()
        .filter_map(|item_id| state.find_work_item(item_id))
        .collect()
}

/// Collect failed items eligible for retry.
///
/// Pure function that extracts failed items based on retry limit.
/// Only returns items where `attempts < max_retries`.
///
/// # Arguments
/// * `state` - Job state containing failed agents
/// * `max_retries` - Maximum retry attempts allowed
///
/// # Returns
/// Vector of work items that failed but are eligible for retry
///
/// # Examples
/// ```ignore
/// let failed = collect_failed_items(&state, 3);
/// // Returns only items with < 3 retry attempts
/// ```
pub fn collect_failed_items(state: &MapReduceJobState, max_retries: u32) -> Vec<Value> {
    state
        .failed_agents
        .iter()
        .filter(|(_, failure)| failure.attempts < max_retries)
        .filter_map(|(item_id, _)| state.find_work_item(item_id))
        .collect()
}

/// Combine items from multiple sources in priority order.
///
/// Pure function using functional composition. Chains iterators to create
/// a single combined list while preserving source priority.
///
/// **Priority order**: pending → failed → dlq
///
/// # Arguments
/// * `pending` - Items not yet started
/// * `failed` - Items that failed and are eligible for retry
/// * `dlq` - Items from Dead Letter Queue
///
/// # Returns
/// Combined vector with all items in priority order
///
/// # Examples
/// ```ignore
/// let combined = combine_work_items(pending, failed, dlq);
/// // pending items appear first, then failed, then dlq
/// ```
pub fn combine_work_items(pending: Vec<Value>, failed: Vec<Value>, dlq: Vec<Value>) -> Vec<Value> {
    pending.into_iter().chain(failed).chain(dlq).collect()
}
