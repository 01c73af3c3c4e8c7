//! Pure session update functions for immutable session transformations
//!
//! This module provides pure functions that transform `UnifiedSession` instances
//! without mutation. All functions take ownership of the session and return a new
//! modified session, preserving immutability.
//!
//! # Design Principles
//!
//! - **Immutability**: Input sessions are never mutated; new sessions are returned
//! - **Purity**: No I/O operations, no side effects
//! - **Validation**: State transitions are validated before applying
//! - **Testability**: All functions can be tested without mocking
//!
//! # Examples
//!
//! ```
//! use prodigy::core::session::updates::{apply_session_update, SessionUpdate, ProgressUpdate};
//! use prodigy::unified_session::UnifiedSession;
//!
//! let session = UnifiedSession::new_workflow("wf-1".to_string(), "test".to_string());
//!
//! // Apply a progress update
//! let update = SessionUpdate::Progress(ProgressUpdate {
//!     completed_steps: 5,
//!     failed_steps: 1,
//!     current_step: Some("step-6".to_string()),
//! });
//!
//! let updated = apply_session_update(session, update).unwrap();
//! ```

use super::validation::{validate_status_transition, SessionTransitionError};
use crate::unified_session::{SessionStatus, UnifiedSession};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Error type for session updates
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdateError {
    /// Invalid state transition
    InvalidTransition(SessionTransitionError),
    /// Missing required session data
    MissingSessionData { session_type: String },
}

impl std::fmt::Display for SessionUpdateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionUpdateError::InvalidTransition(err) => write!(f, "{}", err),
            SessionUpdateError::MissingSessionData { session_type } => {
                write!(f, "Missing {} session data", session_type)
            }
        }
    }
}

impl std::error::Error for SessionUpdateError {}

impl From<SessionTransitionError> for SessionUpdateError {
    fn from(err: SessionTransitionError) -> Self {
        SessionUpdateError::InvalidTransition(err)
    }
}

/// Update types for session state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionUpdate {
    /// Update session status with validation
    Status(SessionStatus),
    /// Update progress counters
    Progress(ProgressUpdate),
    /// Merge new variables with existing
    Variables(HashMap<String, Value>),
    /// Add a step to execution history
    AddStep(StepRecord),
}

/// Progress update data
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Number of steps completed in this update (added to total)
    pub completed_steps: usize,
    /// Number of steps failed in this update (added to total)
    pub failed_steps: usize,
    /// Current step being executed (replaces existing)
    pub current_step: Option<String>,
}

/// Record of a command execution step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    /// Command that was executed
    pub command: String,
    /// When the step started
    pub started_at: DateTime<Utc>,
    /// When the step completed (if finished)
    pub completed_at: Option<DateTime<Utc>>,
    /// Status of the step (e.g., "running", "completed", "failed")
    pub status: String,
    /// Optional output or result
    pub output: Option<String>,
}

impl StepRecord {
    /// Create a new step record for a started command
    pub fn started(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            started_at: Utc::now(),
            completed_at: None,
            status: "running".to_string(),
            output: None,
        }
    }

    /// Mark the step as completed with optional output
    pub fn complete(self, output: Option<String>) -> Self {
        Self {
            completed_at: Some(Utc::now()),
            status: "completed".to_string(),
            output,
            ..self
        }
    }

    /// Mark the step as failed with error message
    pub fn fail(self, error: impl Into<String>) -> Self {
        Self {
            completed_at: Some(Utc::now()),
            status: "failed".to_string(),
            output: Some(error.into()),
            ..self
        }
    }
}

/// Pure: Apply a session update, returning a new session
///
/// This function dispatches to the appropriate update function based on the
/// update type. The `updated_at` timestamp is always updated.
///
/// # Arguments
///
/// * `session` - The session to update (takes ownership)
/// * `update` - The update to apply
///
/// # Returns
///
/// A new session with the update applied, or an error if the update is invalid.
///
/// # Examples
///
/// ```
/// use prodigy::core::session::updates::{apply_session_update, SessionUpdate};
/// use prodigy::unified_session::{SessionStatus, UnifiedSession};
///
/// let session = UnifiedSession::new_workflow("wf-1".to_string(), "test".to_string());
///
/// // Transition from Initializing to Running
/// let result = apply_session_update(
///     session,
///     SessionUpdate::Status(SessionStatus::Running),
/// );
///
/// assert!(result.is_ok());
/// assert_eq!(result.unwrap().status, SessionStatus::Running);
/// ```
pub fn apply_session_update(
    session: UnifiedSession,
    update: SessionUpdate,
) -> Result<UnifiedSession, SessionUpdateError> {
    let updated = UnifiedSession {
        updated_at: Utc::now(),
        ..session
    };

    match update {
        SessionUpdate::Status(status) => apply_status_update(updated, status),
        SessionUpdate::Progress(progress) => apply_progress_update(updated, progress),
        SessionUpdate::Variables(vars) => apply_variable_update(updated, vars),
        SessionUpdate::AddStep(step) => apply_add_step(updated, step),
    }
}

/// Pure: Apply status update with validation
///
/// Validates the status transition before applying. Returns an error if the
/// transition is not valid.
///
/// # Arguments
///
/// * `session` - The session to update
/// * `status` - The new status
///
/// # Returns
///
/// A new session with updated status, or an error for invalid transitions.
pub fn apply_status_update(
    session: UnifiedSession,
    status: SessionStatus,
) -> Result<UnifiedSession, SessionUpdateError> {
    // Validate state transition
    validate_status_transition(&session.status, &status)?;

    // Set completed_at for terminal states
    let completed_at = match &status {
        SessionStatus::Completed | SessionStatus::Failed | SessionStatus::Cancelled => {
            Some(Utc::now())
        }
        _ => session.completed_at,
    };

    Ok(UnifiedSession {
        status,
        completed_at,
        ..session
    })
}

/// Pure: Apply progress update to workflow session
///
/// Increments completed_steps and failed_steps counters, and updates current_step.
/// For workflow sessions, this updates the `workflow_data.current_step` field.
///
/// # Arguments
///
/// * `session` - The session to update
/// * `progress` - The progress update to apply
///
/// # Returns
///
/// A new session with updated progress.
pub fn apply_progress_update(
    session: UnifiedSession,
    progress: ProgressUpdate,
) -> Result<UnifiedSession, SessionUpdateError> {
    // Update workflow_data if present
    let workflow_data = session.workflow_data.map(|mut wd| {
        // Increment completed steps
        for _ in 0..progress.completed_steps {
            if wd.current_step < wd.total_steps {
                wd.completed_steps.push(wd.current_step);
                wd.current_step += 1;
            }
        }
        wd
    });

    // Update mapreduce_data if present
    let mapreduce_data = session.mapreduce_data.map(|mut md| {
        md.processed_items = md.processed_items.saturating_add(progress.completed_steps);
        md.failed_items = md.failed_items.saturating_add(progress.failed_steps);
        md
    });

    // Store current step in metadata if provided
    let metadata = if let Some(ref step) = progress.current_step {
        let mut new_metadata = session.metadata.clone();
        new_metadata.insert("current_step".to_string(), Value::String(step.clone()));
        new_metadata
    } else {
        session.metadata.clone()
    };

    Ok(UnifiedSession {
        workflow_data,
        mapreduce_data,
        metadata,
        ..session
    })
}

/// Pure: Apply variable update (merge)
///
/// Merges new variables with existing variables. New values overwrite existing
/// values with the same key. Existing variables not in the update are preserved.
///
/// # Arguments
///
/// * `session` - The session to update
/// * `new_vars` - Variables to merge
///
/// # Returns
///
/// A new session with merged variables.
pub fn apply_variable_update(
    session: UnifiedSession,
    new_vars: HashMap<String, Value>,
) -> Result<UnifiedSession, SessionUpdateError> {
    let mut metadata = session.metadata.clone();
    metadata.extend(new_vars);

    // Also update workflow variables if workflow session
    let workflow_data = session.workflow_data.map(|mut wd| {
        for (key, value) in metadata.iter() {
            if let Some(s) = value.as_str() {
                wd.variables.insert(key.clone(), s.to_string());
            }
        }
        wd
    });

    Ok(UnifiedSession {
        metadata,
        workflow_data,
        ..session
    })
}

/// Pure: Add step to execution history
///
/// Appends a step record to the session's execution history, preserving
/// chronological order.
///
/// # Arguments
///
/// * `session` - The session to update
/// * `step` - The step record to add
///
/// # Returns
///
/// A new session with the step added to metadata.
pub fn apply_add_step(
    session: UnifiedSession,
    step: StepRecord,
) -> Result<UnifiedSession, SessionUpdateError> {
    let mut metadata = session.metadata.clone();

    // Get or create steps array
    let steps_key = "execution_steps".to_string();
    let mut steps: Vec<Value> = metadata
        .get(&steps_key)
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default();

    // Add new step
    let step_value = serde_json::to_value(&step).unwrap_or(Value::Null);
    steps.push(step_value);

    metadata.insert(steps_key, Value::Array(steps));

    Ok(UnifiedSession {
        metadata,
        ..session
    })
}

/// Apply multiple updates in sequence
///
/// Applies each update in order, stopping on first error.
pub fn apply_updates(
    session: UnifiedSession,
    updates: Vec<SessionUpdate>,
) -> Result<UnifiedSession, SessionUpdateError> {
    updates.into_iter().try_fold(session, apply_session_update)
}
