//! Cargo command handler for Rust project management

use crate::commands::{
    AttributeSchema, AttributeValue, CommandHandler, CommandResult, ExecutionContext,
};
use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::time::Instant;

/// Builds boolean flags from attributes using iterator chains
fn build_boolean_flags(attributes: &HashMap<String, AttributeValue>) -> Vec<String> {
    let flag_mappings = [
        ("release", "--release"),
        ("all_features", "--all-features"),
        ("no_default_features", "--no-default-features"),
        ("verbose", "--verbose"),
        ("quiet", "--quiet"),
    ];

    flag_mappings
        .iter()
        .filter_map(|(key, flag)| {
            attributes
                .get(*key)
                .and_then(|v| v.as_bool())
                .filter(|&enabled| enabled)
                .map(|_| (*flag).to_string())
        })
        .collect()
}

/// Builds string option arguments from attributes using iterator chains
fn build_string_option_args(attributes: &HashMap<String, AttributeValue>) -> Vec<String> {
    let option_mappings = [
        ("features", "--features"),
        ("package", "--package"),
        ("target", "--target"),
    ];

    let regular_options = option_mappings.iter().flat_map(|(key, flag)| {
        attributes
            .get(*key)
            .and_then(|v| v.as_string())
            .map(|value| vec![(*flag).to_string(), value.clone()])
    });

    let args_options = attributes
        .get("args")
        .and_then(|v| v.as_string())
        .into_iter()
        .flat_map(|args| args.split_whitespace().map(|s| s.to_string()));

    regular_options.flatten().chain(args_options).collect()
}

/// Parses cargo command output to extract metadata using functional patterns
fn parse_cargo_metadata(command: &str, stdout: &str) -> serde_json::Value {
    let build_commands = ["build", "test", "check"];

    let mut metadata = json!({
        "command": command,
    });

    if build_commands.contains(&command) {
        if stdout.contains("Finished") {
            metadata["finished"] = json!(true);
        }
        if stdout.contains("warning") {
            let warning_count = stdout.matches("warning").count();
            metadata["warnings"] = json!(warning_count);
        }
    }

    metadata
}

/// Handler for Cargo operations
pub struct CargoHandler;

impl CargoHandler {
    /// Creates a new Cargo handler
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandHandler for CargoHandler {
    fn name(&self) -> &str {
        "cargo"
    }

    fn schema(&self) -> AttributeSchema {
        let mut schema = AttributeSchema::new("cargo");
        schema.add_required("command", "Cargo command to run (build, test, run, etc.)");
        schema.add_optional("args", "Additional arguments for the cargo command");
        schema.add_optional("features", "Features to enable");
        schema.add_optional("package", "Package to operate on (for workspaces)");
        schema.add_optional("target", "Target triple for cross-compilation");
        schema.add_optional_with_default(
            "release",
            "Build in release mode",
            AttributeValue::Boolean(false),
        );
        schema.add_optional_with_default(
            "all_features",
            "Enable all features",
            AttributeValue::Boolean(false),
        );
        schema.add_optional_with_default(
            "no_default_features",
            "Disable default features",
            AttributeValue::Boolean(false),
        );
        schema.add_optional_with_default(
            "verbose",
            "Use verbose output",
            AttributeValue::Boolean(false),
        );
        schema.add_optional_with_default(
            "quiet",
            "Use quiet output",
            AttributeValue::Boolean(false),
        );
        schema
    }

    async fn execute(
        &self,
        context: &ExecutionContext,
        mut attributes: HashMap<String, AttributeValue>,
    ) -> CommandResult {
        // Apply defaults
        self.schema().apply_defaults(&mut attributes);

        // Extract command
        let command = match attributes.get("command").and_then(|v| v.as_string()) {
            Some(cmd) => cmd.clone(),
            None => return CommandResult::error("Missing required attribute: command".to_string()),
        };

        let start = Instant::now();

        // Build cargo command using functional composition
        let cargo_args: Vec<String> = std::iter::once(command.clone())
            .chain(build_boolean_flags(&attributes))
            .chain(build_string_option_args(&attributes))
            .collect();

        if context.dry_run {
            let duration = start.elapsed().as_millis() as u64;
            return CommandResult::success(json!({
                "dry_run": true,
                "command": format!("cargo {}", cargo_args.join(" ")),
            }))
            .with_duration(duration);
        }

        // Set environment variables for better cargo output
        let mut env = context.full_env();
        env.insert("CARGO_TERM_COLOR".to_string(), "always".to_string());

        // Execute cargo command
        let result = context
            .executor
            .execute(
                "cargo",
                &cargo_args.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
                Some(&context.working_dir),
                Some(env),
                None,
            )
            .await;

        let duration = start.elapsed().as_millis() as u64;

        match result {
            Ok(output) => {
                let stdout = String::from_utf8_lossy(&output.stdout).to_string();
                let stderr = String::from_utf8_lossy(&output.stderr).to_string();

                if output.status.success() {
                    // Parse cargo output using pure function
                    let metadata = parse_cargo_metadata(&command, &stdout);

                    CommandResult::success(json!({
                        "output": stdout,
                        "metadata": metadata,
                    }))
                    .with_duration(duration)
                } else {
                    CommandResult::error(format!("Cargo command failed:\n{stderr}"))
                        .with_duration(duration)
                }
            }
            Err(e) => CommandResult::error(format!("Failed to execute cargo command: {e}"))
                .with_duration(duration),
        }
    }

    fn description(&self) -> &str {
        "Handles Rust Cargo operations for building, testing, and managing projects"
    }

    fn examples(&self) -> Vec<String> {
        vec![
            r#"{"command": "build", "release": true}"#.to_string(),
            r#"{"command": "test", "package": "my_crate", "features": "async"}"#.to_string(),
            r#"{"command": "run", "args": "-- --help"}"#.to_string(),
            r#"{"command": "clippy", "args": "-- -W clippy::all"}"#.to_string(),
        ]
    }
}

impl Default for CargoHandler {
    fn default() -> Self {
        Self::new()
    }
}
