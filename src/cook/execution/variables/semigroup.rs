//! Semigroup implementation for aggregate results
//!
//! This module provides the `AggregateResult` type and its `Semigroup` implementation,
//! enabling consistent combination semantics across all aggregate types.
//! The `combine` operation is associative, allowing safe parallel aggregation.

use rayon::prelude::*;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use stillwater::Semigroup;

/// Internal representation of aggregate results that can be combined
///
/// This enum represents intermediate aggregate states that can be combined
/// using the Semigroup trait. Some aggregations (like Average, Median, etc.)
/// track state that gets finalized into a final value later.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregateResult {
    /// Count of items
    Count(usize),

    /// Sum of numeric values
    Sum(f64),

    /// Minimum value
    Min(Value),

    /// Maximum value
    Max(Value),

    /// Collection of all values
    Collect(Vec<Value>),

    /// Average state (sum, count) - finalized to average later
    Average(f64, usize),

    /// Median state - collects all values, computes median on finalize
    Median(Vec<f64>),

    /// Standard deviation state - collects all values
    StdDev(Vec<f64>),

    /// Variance state - collects all values
    Variance(Vec<f64>),

    /// Unique values set
    Unique(HashSet<String>),

    /// Concatenated strings
    Concat(String),

    /// Merged object/map
    Merge(HashMap<String, Value>),

    /// Flattened nested arrays
    Flatten(Vec<Value>),

    /// Sorted values (collected, sorted on finalize)
    Sort(Vec<Value>, bool), // values, descending

    /// Grouped values by key
    GroupBy(HashMap<String, Vec<Value>>),
}

impl Semigroup for AggregateResult {
    fn combine(self, other: Self) -> Self {
        use AggregateResult::*;

        match (self, other) {
            // Numeric aggregations (use saturating arithmetic to prevent overflow)
            (Count(a), Count(b)) => Count(a.saturating_add(b)),
            (Sum(a), Sum(b)) => Sum(a + b),

            // Min/Max - compare and keep appropriate value
            (Min(a), Min(b)) => {
                if compare_values(&a, &b) == std::cmp::Ordering::Less {
                    Min(a)
                } else {
                    Min(b)
                }
            }
            (Max(a), Max(b)) => {
                if compare_values(&a, &b) == std::cmp::Ordering::Greater {
                    Max(a)
                } else {
                    Max(b)
                }
            }

            // Collection aggregations
            (Collect(mut a), Collect(b)) => {
                a.extend(b);
                Collect(a)
            }

            // Stateful aggregations (combine state, finalize later)
            (Average(sum_a, count_a), Average(sum_b, count_b)) => {
                Average(sum_a + sum_b, count_a + count_b)
            }

            (Median(mut a), Median(b)) => {
                a.extend(b);
                Median(a)
            }

            (StdDev(mut a), StdDev(b)) => {
                a.extend(b);
                StdDev(a)
            }

            (Variance(mut a), Variance(b)) => {
                a.extend(b);
                Variance(a)
            }

            // String aggregations
            (Concat(mut a), Concat(b)) => {
                a.push_str(&b);
                Concat(a)
            }

            (Unique(mut a), Unique(b)) => {
                a.extend(b);
                Unique(a)
            }

            // Map aggregations
            (Merge(mut a), Merge(b)) => {
                for (k, v) in b {
                    a.entry(k).or_insert(v);
                }
                Merge(a)
            }

            // Nested collections
            (Flatten(mut a), Flatten(b)) => {
                a.extend(b);
                Flatten(a)
            }

            // Sort - combine collections, preserve descending flag
            (Sort(mut a, desc_a), Sort(b, desc_b)) => {
                a.extend(b);
                // If flags differ, default to first one (could also panic)
                Sort(a, desc_a && desc_b)
            }

            // GroupBy - merge groups
            (GroupBy(mut a), GroupBy(b)) => {
                for (key, mut values) in b {
                    a.entry(key).or_insert_with(Vec::new).append(&mut values);
                }
                GroupBy(a)
            }

            // Incompatible types - this is a programming error
            (a, b) => panic!(
                "Cannot combine incompatible aggregate types: {:?} and {:?}",
                discriminant_name(&a),
                discriminant_name(&b)
            ),
        }
    }
}

impl AggregateResult {
    /// Finalize aggregate result into a JSON value
    ///
    /// This converts the internal aggregate state into the final computed value.
    /// For simple aggregates (Count, Sum), this is straightforward.
    /// For stateful aggregates (Average, Median, StdDev, Variance), this performs
    /// the final computation.
    pub fn finalize(self) -> Value {
        match self {
            AggregateResult::Count(n) => Value::Number(serde_json::Number::from(n)),

            AggregateResult::Sum(s) => serde_json::Number::from_f64(s)
                .map(Value::Number)
                .unwrap_or(Value::Null),

            AggregateResult::Min(v) | AggregateResult::Max(v) => v,

            AggregateResult::Collect(values) => Value::Array(values),

            AggregateResult::Average(sum, count) => {
                if count == 0 {
                    Value::Null
                } else {
                    let avg = sum / count as f64;
                    serde_json::Number::from_f64(avg)
                        .map(Value::Number)
                        .unwrap_or(Value::Null)
                }
            }

            AggregateResult::Median(mut values) => {
                if values.is_empty() {
                    Value::Null
                } else {
                    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
                    let mid = values.len() / 2;
                    serde_json::Number::from_f64(values[mid])
                        .map(Value::Number)
                        .unwrap_or(Value::Null)
                }
            }

            AggregateResult::StdDev(values) => {
                if values.is_empty() {
                    Value::Null
                } else {
                    let mean = values.iter().sum::<f64>() / values.len() as f64;
                    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
                        / values.len() as f64;
                    serde_json::Number::from_f64(variance.sqrt())
                        .map(Value::Number)
                        .unwrap_or(Value::Null)
                }
            }

            AggregateResult::Variance(values) => {
                if values.is_empty() {
                    Value::Null
                } else {
                    let mean = values.iter().sum::<f64>() / values.len() as f64;
                    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
                        / values.len() as f64;
                    serde_json::Number::from_f64(variance)
                        .map(Value::Number)
                        .unwrap_or(Value::Null)
                }
            }

            AggregateResult::Unique(set) => {
                let values: Vec<Value> = set.into_iter().map(Value::String).collect();
                Value::Array(values)
            }

            AggregateResult::Concat(s) => Value::String(s),

            AggregateResult::Merge(map) => Value::Object(map.into_iter().collect()),

            AggregateResult::Flatten(values) => Value::Array(values),

            AggregateResult::Sort(mut values, descending) => {
                values.sort_by(|a, b| {
                    let cmp = compare_values(a, b);
                    if descending {
                        cmp.reverse()
                    } else {
                        cmp
                    }
                });
                Value::Array(values)
            }

            AggregateResult::GroupBy(groups) => {
                let obj: serde_json::Map<String, Value> = groups
                    .into_iter()
                    .map(|(k, v)| (k, Value::Array(v)))
                    .collect();
                Value::Object(obj)
            }
        }
    }
}

/// Compare two JSON values (numeric if possible, otherwise string)
fn compare_values(a: &Value, b: &Value) -> std::cmp::Ordering {
    if let (Some(a_num), Some(b_num)) = (a.as_f64(), b.as_f64()) {
        a_num
            .partial_cmp(&b_num)
            .unwrap_or(std::cmp::Ordering::Equal)
    } else {
        a.to_string().cmp(&b.to_string())
    }
}

/// Get a string representation of the discriminant for error messages
fn discriminant_name(result: &AggregateResult) -> &'static str {
    match result {
        AggregateResult::Count(_) => "Count",
        AggregateResult::Sum(_) => "Sum",
        AggregateResult::Min(_) => "Min",
        AggregateResult::Max(_) => "Max",
        AggregateResult::Collect(_) => "Collect",
        AggregateResult::Average(_, _) => "Average",
        AggregateResult::Median(_) => "Median",
        AggregateResult::StdDev(_) => "StdDev",
        AggregateResult::Variance(_) => "Variance",
        AggregateResult::Unique(_) => "Unique",
        AggregateResult::Concat(_) => "Concat",
        AggregateResult::Merge(_) => "Merge",
        AggregateResult::Flatten(_) => "Flatten",
        AggregateResult::Sort(_, _) => "Sort",
        AggregateResult::GroupBy(_) => "GroupBy",
    }
}

/// Aggregate multiple results in parallel using rayon
///
/// This function leverages rayon's parallel iterator to combine aggregate results
/// concurrently. The semigroup combine operation's associativity guarantees that
/// parallel aggregation produces the same result as sequential aggregation.
///
/// # Arguments
/// * `results` - Vector of aggregate results to combine in parallel
///
/// # Returns
/// * `Some(AggregateResult)` if the vector is non-empty
/// * `None` if the vector is empty
///
/// # Performance
/// Parallel aggregation is beneficial for large datasets (typically >1000 items).
/// For smaller datasets, the overhead of parallelization may outweigh the benefits.
/// Use `aggregate_results` for small datasets.
///
/// # Example
/// ```
/// use prodigy::cook::execution::variables::semigroup::{AggregateResult, parallel_aggregate};
///
/// let results: Vec<_> = (0..10000)
///     .map(|_| AggregateResult::Count(1))
///     .collect();
///
/// let combined = parallel_aggregate(results).unwrap();
/// assert_eq!(combined, AggregateResult::Count(10000));
/// ```
pub fn parallel_aggregate(results: Vec<AggregateResult>) -> Option<AggregateResult> {
    results.into_par_iter().reduce_with(|a, b| a.combine(b))
}
