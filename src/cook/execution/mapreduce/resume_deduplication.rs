//! Pure functions for deduplicating work items in MapReduce resume operations.
//!
//! This module provides functional, testable deduplication logic to ensure each
//! work item is processed exactly once when resuming from multiple sources
//! (pending items, failed items, and DLQ items).

use serde_json::Value;
use std::collections::HashSet;

/// Deduplicate work items by ID, keeping first occurrence of each unique ID.
///
/// Uses a HashSet for O(n) time complexity. Preserves order of first occurrences.
/// This is a pure function with no side effects, making it fully testable.
///
/// # Arguments
/// * `items` - Work items to deduplicate
///
/// # Returns
/// Deduplicated list with first occurrence of each unique item ID
///
/// # Examples
/// ```
/// use serde_json::json;
/// use prodigy::cook::execution::mapreduce::resume_deduplication::deduplicate_work_items;
///
/// let items = vec![
///     json!({"id": "1", "data": "a"}),
///     json!({"id": "2", "data": "b"}),
///     json!({"id": "1", "data": "c"}),  // Duplicate of first
/// ];
/// let deduped = deduplicate_work_items(items);
/// assert_eq!(deduped.len(), 2);
/// ```
pub fn deduplicate_work_items(items: Vec<Value>) -> Vec<Value> {
    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut deduped = Vec::new();

    for item in items {
        let item_id = extract_item_id(&item);

        // Skip items without ID or with duplicate ID
        if !item_id.is_empty() && seen_ids.insert(item_id) {
            deduped.push(item);
        }
    }

    deduped
}

/// Extract item ID from work item JSON.
///
/// Tries multiple field names for compatibility:
/// - "id"
/// - "item_id"
/// - "_id"
///
/// Supports both string and numeric IDs (converts numbers to strings).
///
/// # Arguments
/// * `item` - Work item JSON
///
/// # Returns
/// Item ID string, or empty string if not found
fn extract_item_id(item: &Value) -> String {
    // Try common ID field names
    let id_value = item
        .get("id")
        .or_else(|| item.get("item_id"))
        .or_else(|| item.get("_id"));

    match id_value {
        Some(v) => {
            // Try as string first
            if let Some(s) = v.as_str() {
                s.to_string()
            }
            // Then try as integer
            else if let Some(n) = v.as_i64() {
                n.to_string()
            }
            // Then try as unsigned integer
            else if let Some(n) = v.as_u64() {
                n.to_string()
            } else {
                String::new()
            }
        }
        None => String::new(),
    }
}

/// Count duplicate items in a list.
///
/// Pure function for observability metrics. Useful for logging and monitoring.
///
/// # Arguments
/// * `items` - Work items to analyze
///
/// # Returns
/// Number of duplicate items found
///
/// # Examples
/// ```
/// use serde_json::json;
/// use prodigy::cook::execution::mapreduce::resume_deduplication::count_duplicates;
///
/// let items = vec![
///     json!({"id": "1"}),
///     json!({"id": "2"}),
///     json!({"id": "1"}),  // Duplicate
/// ];
/// assert_eq!(count_duplicates(&items), 1);
/// ```
pub fn count_duplicates(items: &[Value]) -> usize {
    let total = items.len();
    let unique = deduplicate_work_items(items.to_vec()).len();
    total.saturating_sub(unique)
}
