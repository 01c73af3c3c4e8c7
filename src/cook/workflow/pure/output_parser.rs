//! Output parsing functions for workflow command results
//!
//! Provides pure functions for extracting variables from command output:
//! - `parse_output_variables`: Extract variables using multiple patterns
//! - `OutputPattern`: Enum defining extraction patterns (regex, JSON, line)
//!
//! # Examples
//!
//! ```
//! use prodigy::cook::workflow::pure::output_parser::{parse_output_variables, OutputPattern};
//! use regex::Regex;
//!
//! let output = "Result: success\nValue: 42";
//! let patterns = vec![
//!     OutputPattern::Regex {
//!         name: "result".into(),
//!         regex: Regex::new(r"Result: (\w+)").unwrap(),
//!     },
//!     OutputPattern::Line {
//!         name: "second_line".into(),
//!         line_number: 1,
//!     },
//! ];
//!
//! let vars = parse_output_variables(output, &patterns);
//! assert_eq!(vars.get("result").unwrap(), "success");
//! assert_eq!(vars.get("second_line").unwrap(), "Value: 42");
//! ```

use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;

/// Pattern types for extracting variables from command output
#[derive(Debug, Clone)]
pub enum OutputPattern {
    /// Extract using a regex pattern with capture group
    Regex {
        /// Name of the variable to extract
        name: String,
        /// Regex pattern with at least one capture group
        regex: Regex,
    },
    /// Extract using a JSON path expression
    Json {
        /// Name of the variable to extract
        name: String,
        /// JSON path expression (e.g., "$.field" or "$.field.nested")
        json_path: String,
    },
    /// Extract a specific line by line number (0-indexed)
    Line {
        /// Name of the variable to extract
        name: String,
        /// Line number to extract (0-indexed)
        line_number: usize,
    },
}

/// Pure: Extract variables from command output using patterns
///
/// Applies each pattern to the output and collects successful matches
/// into a HashMap. Patterns that don't match are silently skipped.
///
/// # Arguments
///
/// * `output` - The command output to parse
/// * `patterns` - A slice of patterns to apply
///
/// # Returns
///
/// A HashMap of variable names to extracted values
///
/// # Examples
///
/// ```
/// use prodigy::cook::workflow::pure::output_parser::{parse_output_variables, OutputPattern};
/// use regex::Regex;
///
/// let output = r#"{"status": "ok", "count": 10}"#;
/// let patterns = vec![
///     OutputPattern::Json {
///         name: "status".into(),
///         json_path: "$.status".into(),
///     },
/// ];
///
/// let vars = parse_output_variables(output, &patterns);
/// assert_eq!(vars.get("status").unwrap(), "ok");
/// ```
pub fn parse_output_variables(output: &str, patterns: &[OutputPattern]) -> HashMap<String, String> {
    patterns
        .iter()
        .filter_map(|pattern| extract_match(output, pattern))
        .collect()
}

/// Pure: Extract single variable match from output
fn extract_match(output: &str, pattern: &OutputPattern) -> Option<(String, String)> {
    match pattern {
        OutputPattern::Regex { name, regex } => regex
            .captures(output)
            .and_then(|cap| cap.get(1).map(|m| (name.clone(), m.as_str().to_string()))),
        OutputPattern::Json { name, json_path } => {
            extract_json_path(output, json_path).map(|value| (name.clone(), value))
        }
        OutputPattern::Line { name, line_number } => output
            .lines()
            .nth(*line_number)
            .map(|line| (name.clone(), line.to_string())),
    }
}

/// Pure: Extract value from JSON using a simple JSON path
///
/// Supports paths like:
/// - `$` - root value
/// - `$.field` - direct field access
/// - `$.field.nested` - nested field access
///
/// Does NOT support array indexing (e.g., `$.items[0]`) - use regex for that.
fn extract_json_path(json_str: &str, path: &str) -> Option<String> {
    let value: Value = serde_json::from_str(json_str).ok()?;

    // Handle empty path or just "$"
    if !path.starts_with('$') {
        return None;
    }

    let path = &path[1..]; // Remove $
    if path.is_empty() {
        return Some(value_to_string(&value));
    }

    // Remove leading dot if present
    let path = path.strip_prefix('.').unwrap_or(path);
    if path.is_empty() {
        return Some(value_to_string(&value));
    }

    // Navigate through the JSON structure
    let mut current = &value;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }

    Some(value_to_string(current))
}

/// Convert JSON value to string representation
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(_) | Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_parse_output_is_deterministic(
            output in ".*",
            line_num in 0usize..10,
        ) {
            let patterns = vec![OutputPattern::Line {
                name: "line".into(),
                line_number: line_num,
            }];

            let result1 = parse_output_variables(&output, &patterns);
            let result2 = parse_output_variables(&output, &patterns);

            prop_assert_eq!(result1, result2);
        }

        #[test]
        fn prop_parse_output_empty_patterns_returns_empty(output in ".*") {
            let patterns: Vec<OutputPattern> = vec![];

            let result = parse_output_variables(&output, &patterns);

            prop_assert!(result.is_empty());
        }

        #[test]
        fn prop_line_extraction_valid_line(
            lines in prop::collection::vec("[^\n]+", 1..5),  // Use non-empty lines to avoid edge cases
            line_idx in 0usize..5,
        ) {
            let output = lines.join("\n");
            let patterns = vec![OutputPattern::Line {
                name: "line".into(),
                line_number: line_idx,
            }];

            let result = parse_output_variables(&output, &patterns);

            // Note: Rust's lines() iterator doesn't return a trailing empty line
            // So we compare against the actual lines iterator behavior
            let actual_line = output.lines().nth(line_idx);

            match actual_line {
                Some(expected) => {
                    prop_assert_eq!(result.get("line"), Some(&expected.to_string()));
                }
                None => {
                    prop_assert!(result.is_empty());
                }
            }
        }
    }
}
