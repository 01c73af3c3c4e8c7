//! Reduce phase checkpoint structures and methods for MapReduce workflows
//!
//! This module defines the checkpoint structure used during the reduce phase,
//! allowing the workflow to resume from any point within reduce command execution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Checkpoint for the reduce phase containing execution state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReducePhaseCheckpoint {
    /// Version of the checkpoint format
    pub version: u32,

    /// Number of reduce steps completed
    pub completed_steps: usize,

    /// Total number of reduce steps
    pub total_steps: usize,

    /// Results from each completed reduce step
    pub step_results: Vec<StepResult>,

    /// Variables captured during reduce execution
    pub variables: HashMap<String, String>,

    /// Aggregated results from the map phase
    pub map_results: Vec<Value>,

    /// When this checkpoint was created
    pub timestamp: DateTime<Utc>,
}

/// Result from executing a single reduce step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    /// Index of the step (0-based)
    pub step_index: usize,

    /// Whether the step succeeded
    pub success: bool,

    /// Output captured from the step
    pub output: Option<String>,

    /// Error message if step failed
    pub error: Option<String>,

    /// Duration of step execution in seconds
    pub duration_secs: f64,
}

impl ReducePhaseCheckpoint {
    /// Create a new reduce phase checkpoint
    pub fn new(
        total_steps: usize,
        completed_steps: usize,
        step_results: Vec<StepResult>,
        variables: HashMap<String, String>,
        map_results: Vec<Value>,
    ) -> Self {
        Self {
            version: 1,
            completed_steps,
            total_steps,
            step_results,
            variables,
            map_results,
            timestamp: Utc::now(),
        }
    }

    /// Check if the reduce phase can be resumed from this checkpoint
    pub fn can_resume(&self) -> bool {
        // Can resume if there are still steps remaining
        self.completed_steps < self.total_steps
    }

    /// Get the index of the next step to execute
    pub fn next_step_index(&self) -> Option<usize> {
        if self.can_resume() {
            Some(self.completed_steps)
        } else {
            None
        }
    }

    /// Get the number of remaining steps
    pub fn remaining_steps(&self) -> usize {
        self.total_steps.saturating_sub(self.completed_steps)
    }

    /// Get progress as a percentage (0.0 to 1.0)
    pub fn progress(&self) -> f64 {
        if self.total_steps == 0 {
            1.0
        } else {
            self.completed_steps as f64 / self.total_steps as f64
        }
    }
}
