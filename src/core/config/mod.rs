//! Pure configuration processing functions
//!
//! These functions handle configuration parsing, validation, and transformation
//! without performing any I/O operations.

use crate::config::{Config, ProjectConfig, WorkflowConfig};
use anyhow::{anyhow, Result};
use serde_yaml::Value;

/// Parse YAML content into a WorkflowConfig
pub fn parse_workflow_config(content: &str) -> Result<WorkflowConfig> {
    // First try to parse as a full config with workflow section
    if let Ok(full_config) = serde_yaml::from_str::<Value>(content) {
        if let Some(workflow_value) = full_config.get("workflow") {
            return serde_yaml::from_value(workflow_value.clone())
                .map_err(|e| anyhow!("Failed to parse workflow configuration: {}", e));
        }
    }

    // Try to parse as direct WorkflowConfig
    serde_yaml::from_str(content).map_err(|e| anyhow!("Failed to parse YAML configuration: {}", e))
}

/// Parse YAML content into a ProjectConfig
pub fn parse_project_config(content: &str) -> Result<ProjectConfig> {
    serde_yaml::from_str(content)
        .map_err(|e| anyhow!("Failed to parse project configuration: {}", e))
}

/// Merge workflow config into existing config
pub fn merge_workflow_config(mut config: Config, workflow: WorkflowConfig) -> Config {
    config.workflow = Some(workflow);
    config
}

/// Merge project config into existing config
pub fn merge_project_config(mut config: Config, project: ProjectConfig) -> Config {
    config.project = Some(project);
    config
}

/// Validate configuration format based on file extension
pub fn validate_config_format(extension: &str) -> Result<()> {
    match extension {
        "yaml" | "yml" => Ok(()),
        _ => Err(anyhow!(
            "Unsupported configuration file format. Use .yaml or .yml"
        )),
    }
}
