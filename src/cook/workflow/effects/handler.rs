//! Handler command execution effects
//!
//! This module provides Effect-based abstractions for executing registered
//! handler commands using the command registry.
//!
//! # Architecture
//!
//! Handlers are modular command implementations that can be registered
//! with the workflow executor. This module wraps handler execution in
//! Effects for composability and testability.
//!
//! # Example
//!
//! ```ignore
//! use prodigy::cook::workflow::effects::handler::execute_handler_effect;
//! use std::collections::HashMap;
//!
//! let mut attributes = HashMap::new();
//! attributes.insert("path".to_string(), "/tmp/data".into());
//!
//! let effect = execute_handler_effect("file-reader", attributes);
//! let result = effect.run(&env).await?;
//! ```

use super::environment::WorkflowEnv;
use super::{CommandError, CommandOutput};
use crate::commands::AttributeValue;
use crate::cook::workflow::pure::build_command;
use std::collections::HashMap;
use stillwater::Effect;

/// Effect: Execute a registered handler command
///
/// This effect executes a handler from the command registry with the
/// given attributes. Handlers are modular command implementations that
/// can process attributes and return structured output.
///
/// # Arguments
///
/// * `handler_name` - Name of the registered handler
/// * `attributes` - Map of attribute names to values
/// * `variables` - Variables for attribute value interpolation
///
/// # Returns
///
/// An Effect that, when run, will:
/// 1. Pure: Interpolate variables in attribute values
/// 2. I/O: Execute the handler via the registry
/// 3. Return the handler output
///
/// # Example
///
/// ```ignore
/// let mut attrs = HashMap::new();
/// attrs.insert("input".to_string(), AttributeValue::String("${file}".to_string()));
///
/// let mut vars = HashMap::new();
/// vars.insert("file".to_string(), "data.json".to_string());
///
/// let effect = execute_handler_effect("json-processor", attrs, &vars);
/// let output = effect.run(&env).await?;
/// ```
///
/// # Note
///
/// Handler execution is currently a placeholder. Full integration with
/// the CommandRegistry will be implemented when the workflow executor
/// is refactored to use effects (spec 174f).
pub fn execute_handler_effect(
    handler_name: &str,
    attributes: HashMap<String, AttributeValue>,
    variables: &HashMap<String, String>,
) -> Effect<CommandOutput, CommandError, WorkflowEnv> {
    let handler_name = handler_name.to_string();
    let attributes = attributes.clone();
    let variables = variables.clone();

    Effect::from_async(move |env: &WorkflowEnv| {
        let handler_name = handler_name.clone();
        let attributes = attributes.clone();
        let variables = variables.clone();
        let working_dir = env.working_dir.clone();
        let _env_vars = env.env_vars.clone();

        async move {
            // Pure: Interpolate string attributes
            let interpolated_attrs: HashMap<String, AttributeValue> = attributes
                .into_iter()
                .map(|(key, value)| {
                    let interpolated_value = interpolate_attribute_value(&value, &variables);
                    (key, interpolated_value)
                })
                .collect();

            // Note: Full handler execution will be integrated in spec 174f
            // For now, return a placeholder output
            //
            // Future implementation will:
            // 1. Look up handler in registry
            // 2. Create ExecutionContext with working_dir and env_vars
            // 3. Execute handler.execute(context, attributes)
            // 4. Convert CommandResult to CommandOutput

            // Placeholder: Return success with handler info
            Ok(CommandOutput {
                stdout: format!(
                    "Handler '{}' executed with {} attributes in {}",
                    handler_name,
                    interpolated_attrs.len(),
                    working_dir.display()
                ),
                stderr: String::new(),
                exit_code: Some(0),
                success: true,
                variables: HashMap::new(),
                json_log_location: None,
            })
        }
    })
}

/// Pure: Interpolate variables in an AttributeValue
///
/// Recursively processes attribute values, interpolating string values
/// using the provided variable map.
fn interpolate_attribute_value(
    value: &AttributeValue,
    variables: &HashMap<String, String>,
) -> AttributeValue {
    match value {
        AttributeValue::String(s) => AttributeValue::String(build_command(s, variables)),
        AttributeValue::Array(arr) => AttributeValue::Array(
            arr.iter()
                .map(|v| interpolate_attribute_value(v, variables))
                .collect(),
        ),
        AttributeValue::Object(obj) => AttributeValue::Object(
            obj.iter()
                .map(|(k, v)| (k.clone(), interpolate_attribute_value(v, variables)))
                .collect(),
        ),
        // Other types don't need interpolation
        other => other.clone(),
    }
}
