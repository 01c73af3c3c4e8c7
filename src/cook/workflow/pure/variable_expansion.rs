//! Variable expansion functions for workflow templates
//!
//! Provides pure functions for expanding variables in template strings:
//! - `expand_variables`: Expand ${VAR} and $VAR patterns
//! - `extract_variable_references`: Extract all variable references from a template
//!
//! # Examples
//!
//! ```
//! use prodigy::cook::workflow::pure::variable_expansion::{expand_variables, extract_variable_references};
//! use std::collections::HashMap;
//!
//! let template = "echo ${name} $value";
//! let vars: HashMap<String, String> = [
//!     ("name".into(), "test".into()),
//!     ("value".into(), "123".into()),
//! ].iter().cloned().collect();
//!
//! let result = expand_variables(template, &vars);
//! assert_eq!(result, "echo test 123");
//!
//! let refs = extract_variable_references(template);
//! assert!(refs.contains("name"));
//! assert!(refs.contains("value"));
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

/// Regex for matching braced variables ${VAR}
static BRACED_VAR_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([a-zA-Z_][a-zA-Z0-9_]*)\}").expect("Valid regex pattern"));

/// Regex for matching simple variables $VAR (captures the full variable name)
/// We match the variable and then check the following character manually
static SIMPLE_VAR_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$([a-zA-Z_][a-zA-Z0-9_]*)").expect("Valid regex pattern"));

/// Pure: Expand variables in template string
///
/// Supports two variable syntaxes:
/// - `${VAR}` - Braced variable (expanded first, more specific)
/// - `$VAR` - Simple variable (expanded with word boundary check)
///
/// Variables not found in the provided map are left unexpanded.
///
/// # Arguments
///
/// * `template` - The template string containing variable placeholders
/// * `variables` - A map of variable names to their values
///
/// # Returns
///
/// The template with all found variables expanded
///
/// # Examples
///
/// ```
/// use prodigy::cook::workflow::pure::variable_expansion::expand_variables;
/// use std::collections::HashMap;
///
/// let vars: HashMap<String, String> = [
///     ("name".into(), "Alice".into()),
/// ].iter().cloned().collect();
///
/// assert_eq!(expand_variables("Hello ${name}", &vars), "Hello Alice");
/// assert_eq!(expand_variables("Hello $name", &vars), "Hello Alice");
/// assert_eq!(expand_variables("${missing}", &vars), "${missing}");
/// ```
pub fn expand_variables(template: &str, variables: &HashMap<String, String>) -> String {
    let mut result = template.to_string();

    // Expand ${VAR} first (more specific pattern)
    for (key, value) in variables {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, value);
    }

    // Expand $VAR with word boundaries (using manual boundary checking)
    for (key, value) in variables {
        if key.is_empty() {
            continue;
        }
        result = expand_simple_var(&result, key, value);
    }

    result
}

/// Expand a simple $VAR pattern with word boundary checking
///
/// This function manually checks that the character following the variable
/// name is not an identifier character (letter, digit, or underscore).
fn expand_simple_var(template: &str, var_name: &str, value: &str) -> String {
    let pattern = format!("${}", var_name);
    let pattern_len = pattern.len();
    let mut result = String::with_capacity(template.len());
    let mut i = 0;
    let chars: Vec<char> = template.chars().collect();

    while i < chars.len() {
        // Check if we're at a potential variable match
        let remaining: String = chars[i..].iter().collect();
        if remaining.starts_with(&pattern) {
            // Check if the next character (after the pattern) is NOT an identifier char
            let end_pos = i + pattern_len;
            let next_char = chars.get(end_pos).copied();

            if !is_identifier_char(next_char) {
                // This is a valid variable reference - replace it
                result.push_str(value);
                i = end_pos;
                continue;
            }
        }

        result.push(chars[i]);
        i += 1;
    }

    result
}

/// Check if a character is a valid identifier character (letter, digit, or underscore)
fn is_identifier_char(c: Option<char>) -> bool {
    match c {
        Some(ch) => ch.is_ascii_alphanumeric() || ch == '_',
        None => false,
    }
}

/// Pure: Extract all variable references from a template
///
/// Finds all `${VAR}` and `$VAR` patterns and returns the unique set
/// of variable names referenced.
///
/// # Arguments
///
/// * `template` - The template string to scan for variable references
///
/// # Returns
///
/// A set of unique variable names found in the template
///
/// # Examples
///
/// ```
/// use prodigy::cook::workflow::pure::variable_expansion::extract_variable_references;
///
/// let refs = extract_variable_references("echo ${name} $value ${name}");
/// assert_eq!(refs.len(), 2);
/// assert!(refs.contains("name"));
/// assert!(refs.contains("value"));
/// ```
pub fn extract_variable_references(template: &str) -> HashSet<String> {
    let mut refs = HashSet::new();

    // Match ${VAR} pattern
    for cap in BRACED_VAR_REGEX.captures_iter(template) {
        refs.insert(cap[1].to_string());
    }

    // Match $VAR pattern with word boundary checking
    // We need to manually verify that the character after the match
    // is not an identifier character
    for cap in SIMPLE_VAR_REGEX.captures_iter(template) {
        let full_match = cap.get(0).unwrap();
        let var_name = cap[1].to_string();

        // Get the character after the match (if any)
        let end_pos = full_match.end();
        let next_char = template[end_pos..].chars().next();

        // Only add if the next character is not an identifier character
        // (This handles cases like $name_with_suffix where we don't want to match $name)
        if !is_identifier_char(next_char) {
            refs.insert(var_name);
        }
    }

    refs
}
