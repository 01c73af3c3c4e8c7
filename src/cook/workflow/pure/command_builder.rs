//! Command building functions for workflow templates
//!
//! Provides pure functions for building command strings from templates:
//! - `build_command`: Build a command by expanding variables in a template
//!
//! # Examples
//!
//! ```
//! use prodigy::cook::workflow::pure::command_builder::build_command;
//! use std::collections::HashMap;
//!
//! let template = "echo ${name} ${value}";
//! let vars: HashMap<String, String> = [
//!     ("name".into(), "test".into()),
//!     ("value".into(), "123".into()),
//! ].iter().cloned().collect();
//!
//! let result = build_command(template, &vars);
//! assert_eq!(result, "echo test 123");
//! ```

use std::collections::HashMap;

use super::variable_expansion::expand_variables;

/// Pure: Build command string from template
///
/// This is the primary entry point for command building. It expands
/// all variables in the template using the provided variable map.
///
/// Variables not found in the map are left unexpanded, which allows
/// for multi-stage expansion where some variables may be resolved
/// at different stages of execution.
///
/// # Arguments
///
/// * `template` - The command template containing variable placeholders
/// * `variables` - A map of variable names to their values
///
/// # Returns
///
/// The command string with all found variables expanded
///
/// # Examples
///
/// ```
/// use prodigy::cook::workflow::pure::command_builder::build_command;
/// use std::collections::HashMap;
///
/// let vars: HashMap<String, String> = [
///     ("item".into(), "spec-01".into()),
///     ("output".into(), "result.txt".into()),
/// ].iter().cloned().collect();
///
/// let cmd = build_command("process ${item} > ${output}", &vars);
/// assert_eq!(cmd, "process spec-01 > result.txt");
/// ```
pub fn build_command(template: &str, variables: &HashMap<String, String>) -> String {
    expand_variables(template, variables)
}
