//! Pure functions for resume workflow logic
//! Following functional programming principles with no side effects

use crate::cook::workflow::checkpoint::{WorkflowCheckpoint, WorkflowStatus};
use std::path::{Path, PathBuf};

/// Result of finding workflow file
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowFileResult {
    Found(PathBuf),
    NotFound(Vec<PathBuf>),
    Multiple(Vec<PathBuf>),
}

/// Pure function to determine possible workflow file paths
pub fn possible_workflow_paths(working_dir: &Path, workflow_name: Option<&str>) -> Vec<PathBuf> {
    if let Some(name) = workflow_name {
        vec![
            working_dir.join(format!("{}.yml", name)),
            working_dir.join(format!("{}.yaml", name)),
            working_dir.join("workflow.yml"),
            working_dir.join("workflow.yaml"),
            working_dir.join("playbook.yml"),
            working_dir.join("playbook.yaml"),
            working_dir.join("test_complete_resume.yml"),
            working_dir.join("test_checkpoint.yml"),
        ]
    } else {
        vec![
            working_dir.join("workflow.yml"),
            working_dir.join("workflow.yaml"),
            working_dir.join("playbook.yml"),
            working_dir.join("playbook.yaml"),
        ]
    }
}

/// Pure function to find workflow file
pub fn find_workflow_file(
    paths: &[PathBuf],
    file_exists: impl Fn(&Path) -> bool,
) -> WorkflowFileResult {
    let existing: Vec<PathBuf> = paths.iter().filter(|p| file_exists(p)).cloned().collect();

    match existing.len() {
        0 => WorkflowFileResult::NotFound(paths.to_vec()),
        1 => WorkflowFileResult::Found(existing.into_iter().next().unwrap()),
        _ => WorkflowFileResult::Multiple(existing),
    }
}

/// Generate checkpoint status message
pub fn format_checkpoint_status(checkpoint: &WorkflowCheckpoint) -> Vec<String> {
    vec![
        format!(
            "✅ Found checkpoint for workflow: {}",
            checkpoint.workflow_id
        ),
        format!(
            "   Step progress: {}/{}",
            checkpoint.execution_state.current_step_index, checkpoint.execution_state.total_steps
        ),
        format!("   Status: {:?}", checkpoint.execution_state.status),
    ]
}

/// Generate resume action message based on force flag and status
pub fn format_resume_action(force: bool, status: &WorkflowStatus) -> String {
    match (force, status) {
        (true, _) => "📂 Force restarting workflow from beginning".to_string(),
        (false, WorkflowStatus::Interrupted) => {
            "📂 Resuming workflow from checkpoint...".to_string()
        }
        (false, WorkflowStatus::Failed) => "📂 Resuming workflow after failure...".to_string(),
        (false, _) => "📂 Resuming workflow...".to_string(),
    }
}

/// Determine if resume should proceed
pub fn should_resume(status: &WorkflowStatus, force: bool) -> (bool, Option<String>) {
    match status {
        WorkflowStatus::Completed if !force => (
            false,
            Some("Workflow already completed - nothing to resume".to_string()),
        ),
        WorkflowStatus::Running if !force => {
            (false, Some("Workflow is already running".to_string()))
        }
        _ => (true, None),
    }
}

/// Calculate steps to skip
pub fn calculate_skip_count(checkpoint: &WorkflowCheckpoint, force: bool) -> usize {
    if force {
        0
    } else {
        checkpoint.execution_state.current_step_index
    }
}
