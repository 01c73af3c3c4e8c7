//! Retry tracking for MapReduce work items.
//!
//! This module provides pure functions to track retry attempts across
//! MapReduce executions, enabling accurate DLQ failure history and
//! retry strategies.
//!
//! **Key Functions**:
//! - `get_item_attempt_number()` - Get current attempt number
//! - `increment_retry_count()` - Update retry count
//! - `merge_retry_counts()` - Combine counts from multiple sources

use crate::cook::execution::dlq::DeadLetteredItem;
use crate::cook::execution::state::FailureRecord;
use std::collections::HashMap;

/// Get the attempt number for a work item.
///
/// Returns the current attempt count + 1 (since this is the next attempt).
/// If item has never been attempted, returns 1.
///
/// # Arguments
/// * `item_id` - The work item identifier
/// * `retry_counts` - Map of item IDs to retry counts
///
/// # Returns
/// The attempt number for this execution (1-indexed)
///
/// # Examples
/// ```
/// use std::collections::HashMap;
/// use prodigy::cook::execution::mapreduce::retry_tracking::get_item_attempt_number;
///
/// let mut retry_counts = HashMap::new();
///
/// // First attempt
/// assert_eq!(get_item_attempt_number("item-1", &retry_counts), 1);
///
/// // After one retry
/// retry_counts.insert("item-1".to_string(), 1);
/// assert_eq!(get_item_attempt_number("item-1", &retry_counts), 2);
/// ```
pub fn get_item_attempt_number(item_id: &str, retry_counts: &HashMap<String, u32>) -> u32 {
    retry_counts
        .get(item_id)
        .map(|count| count + 1)
        .unwrap_or(1)
}

/// Increment retry count for an item.
///
/// Pure function - returns new HashMap with incremented count.
///
/// # Arguments
/// * `item_id` - The work item identifier
/// * `retry_counts` - Current retry counts map
///
/// # Returns
/// New HashMap with incremented count for the item
pub fn increment_retry_count(
    item_id: &str,
    mut retry_counts: HashMap<String, u32>,
) -> HashMap<String, u32> {
    *retry_counts.entry(item_id.to_string()).or_insert(0) += 1;
    retry_counts
}

/// Get retry counts from multiple sources (failed_agents, DLQ).
///
/// Pure function that merges retry information.
///
/// # Arguments
/// * `failed_items` - Items from failed_agents with their failure counts
/// * `dlq_items` - Items from DLQ with their failure counts
///
/// # Returns
/// Merged retry counts map
pub fn merge_retry_counts(
    failed_items: &HashMap<String, FailureRecord>,
    dlq_items: &[DeadLetteredItem],
) -> HashMap<String, u32> {
    let mut counts = HashMap::new();

    // Add counts from failed_agents
    for (item_id, failure) in failed_items {
        counts.insert(item_id.clone(), failure.attempts);
    }

    // Merge with DLQ counts (use max if both exist)
    for dlq_item in dlq_items {
        counts
            .entry(dlq_item.item_id.clone())
            .and_modify(|count| *count = (*count).max(dlq_item.failure_count))
            .or_insert(dlq_item.failure_count);
    }

    counts
}
