//! Pure functions for variable interpolation
//!
//! These functions handle building variable contexts from JSON items,
//! flattening nested objects, and extracting variable references.

use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::LazyLock;

// Static regex patterns for variable extraction
static BRACED_VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("Invalid regex pattern"));
static UNBRACED_VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$([A-Za-z_][A-Za-z0-9_]*)").expect("Invalid regex pattern"));

/// Build item variables from JSON value
///
/// # Arguments
///
/// * `item` - JSON item to extract variables from
/// * `item_id` - ID to assign to the item
///
/// # Returns
///
/// HashMap of variable names to string values
///
/// # Examples
///
/// ```
/// use prodigy::cook::execution::mapreduce::pure::interpolation::build_item_variables;
/// use serde_json::json;
///
/// let item = json!({"name": "test", "priority": 5});
/// let vars = build_item_variables(&item, "item-1");
/// assert_eq!(vars.get("item.id").unwrap(), "item-1");
/// assert_eq!(vars.get("item.name").unwrap(), "test");
/// assert_eq!(vars.get("item.priority").unwrap(), "5");
/// ```
pub fn build_item_variables(item: &Value, item_id: &str) -> HashMap<String, String> {
    let mut vars = HashMap::new();

    // Always include item ID
    vars.insert("item.id".to_string(), item_id.to_string());

    // Flatten JSON object to variables
    if let Some(obj) = item.as_object() {
        for (key, value) in obj {
            let var_name = format!("item.{}", key);
            if let Some(string_value) = value_to_string(value) {
                vars.insert(var_name, string_value);
            }
        }
    }

    vars
}

/// Convert JSON value to string
fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some("null".to_string()),
        Value::Array(_) | Value::Object(_) => serde_json::to_string(value).ok(),
    }
}

/// Flatten nested JSON object to dot-notation variables
///
/// # Arguments
///
/// * `obj` - JSON object to flatten
///
/// # Returns
///
/// HashMap of flattened variable names to string values
///
/// # Examples
///
/// ```
/// use prodigy::cook::execution::mapreduce::pure::interpolation::flatten_json_to_vars;
/// use serde_json::json;
///
/// let obj = json!({"user": {"name": "Alice", "age": 30}}).as_object().unwrap().clone();
/// let vars = flatten_json_to_vars(&obj);
/// assert_eq!(vars.get("user.name").unwrap(), "Alice");
/// assert_eq!(vars.get("user.age").unwrap(), "30");
/// ```
pub fn flatten_json_to_vars(obj: &Map<String, Value>) -> HashMap<String, String> {
    let mut vars = HashMap::new();

    for (key, value) in obj {
        flatten_value(&mut vars, key, value);
    }

    vars
}

fn flatten_value(vars: &mut HashMap<String, String>, prefix: &str, value: &Value) {
    match value {
        Value::Object(obj) => {
            for (key, val) in obj {
                let new_prefix = format!("{}.{}", prefix, key);
                flatten_value(vars, &new_prefix, val);
            }
        }
        _ => {
            if let Some(string_value) = value_to_string(value) {
                vars.insert(prefix.to_string(), string_value);
            }
        }
    }
}

/// Extract variable names from template
///
/// # Arguments
///
/// * `template` - Template string containing variable references
///
/// # Returns
///
/// Vector of variable names found in template
///
/// # Examples
///
/// ```
/// use prodigy::cook::execution::mapreduce::pure::interpolation::extract_variable_names;
///
/// let template = "Process ${item.name} with priority $PRIORITY";
/// let vars = extract_variable_names(template);
/// assert!(vars.contains(&"item.name".to_string()));
/// assert!(vars.contains(&"PRIORITY".to_string()));
/// ```
pub fn extract_variable_names(template: &str) -> Vec<String> {
    let mut vars = Vec::new();

    // Match ${var} patterns
    for cap in BRACED_VAR_PATTERN.captures_iter(template) {
        vars.push(cap[1].to_string());
    }

    // Match $var patterns (but not if already captured by braced pattern)
    for cap in UNBRACED_VAR_PATTERN.captures_iter(template) {
        let var_name = cap[1].to_string();
        // Only add if not already in list (from braced pattern)
        if !vars.contains(&var_name) {
            vars.push(var_name);
        }
    }

    vars
}

/// Validate interpolation context has required variables
///
/// # Arguments
///
/// * `template` - Template string to validate
/// * `context` - Variable context to check against
///
/// # Returns
///
/// Ok if all variables present, Err with list of missing variables
pub fn validate_context(
    template: &str,
    context: &HashMap<String, String>,
) -> Result<(), Vec<String>> {
    let required = extract_variable_names(template);
    let missing: Vec<String> = required
        .into_iter()
        .filter(|var| !context.contains_key(var))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(missing)
    }
}
