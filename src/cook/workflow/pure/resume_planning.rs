//! Pure resume planning functions for workflow resumption
//!
//! This module provides pure functions for planning workflow resume from checkpoints.
//! All functions are side-effect free and can be tested without I/O.

use crate::cook::workflow::checkpoint::{WorkflowCheckpoint, WorkflowStatus};

/// Plan for resuming workflow execution
#[derive(Debug, Clone)]
pub struct ResumePlan {
    /// Step index to start from
    pub start_index: usize,
    /// Whether to retry the failed step
    pub retry_failed: bool,
    /// Steps to skip (already completed)
    pub skip_indices: Vec<usize>,
    /// Whether to restore variables from checkpoint
    pub restore_variables: bool,
    /// Warnings about non-idempotent steps or other concerns
    pub warnings: Vec<String>,
}

/// Plan resume from checkpoint (pure function)
///
/// Determines where to resume execution based on checkpoint state.
/// This is a pure function with no I/O.
///
/// The function analyzes the checkpoint to determine:
/// - Which step to start from
/// - Whether to retry a failed step
/// - Which steps can be skipped (already completed)
/// - Any warnings about non-idempotent operations
pub fn plan_resume(checkpoint: &WorkflowCheckpoint) -> ResumePlan {
    let completed_indices: Vec<usize> = checkpoint
        .completed_steps
        .iter()
        .map(|s| s.step_index)
        .collect();

    let start_index = checkpoint.execution_state.current_step_index;

    let retry_failed = matches!(
        checkpoint.execution_state.status,
        WorkflowStatus::Failed | WorkflowStatus::Interrupted
    );

    let mut warnings = Vec::new();

    // Check for non-idempotent steps being resumed
    if retry_failed {
        // Note: In production, we'd check step metadata for idempotency
        warnings.push(format!(
            "Resuming from step {}. Verify step is safe to retry.",
            start_index
        ));
    }

    ResumePlan {
        start_index,
        retry_failed,
        skip_indices: completed_indices,
        restore_variables: true,
        warnings,
    }
}

/// Validate checkpoint is compatible with workflow
///
/// Checks that the checkpoint matches the current workflow definition.
/// Returns Ok if compatible, or an error message describing the incompatibility.
pub fn validate_checkpoint_compatibility(
    checkpoint: &WorkflowCheckpoint,
    workflow_hash: &str,
    total_steps: usize,
) -> Result<(), String> {
    if checkpoint.workflow_hash != workflow_hash {
        return Err(format!(
            "Workflow has changed since checkpoint (hash mismatch). \
             Checkpoint has {} steps, current workflow has {} steps.",
            checkpoint.total_steps, total_steps
        ));
    }

    if checkpoint.execution_state.current_step_index > total_steps {
        return Err(format!(
            "Checkpoint step index {} exceeds workflow steps {}",
            checkpoint.execution_state.current_step_index, total_steps
        ));
    }

    Ok(())
}
