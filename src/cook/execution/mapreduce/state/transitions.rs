//! State machine transitions for MapReduce jobs
//!
//! Manages valid state transitions and enforces state machine invariants.

use super::{JobState, PhaseType, StateError, StateEvent, StateEventType, StateManager};
use chrono::Utc;
use tracing::{debug, error, info};

impl StateManager {
    /// Transition job to a new phase
    pub async fn transition_to_phase(
        &self,
        job_id: &str,
        new_phase: PhaseType,
    ) -> Result<(), StateError> {
        let state = self
            .get_state(job_id)
            .await?
            .ok_or_else(|| StateError::NotFound(job_id.to_string()))?;

        let old_phase = state.phase;

        // Check if transition is valid
        if !self.transitions.is_valid_transition(old_phase, new_phase) {
            return Err(StateError::InvalidTransition {
                from: old_phase,
                to: new_phase,
            });
        }

        // Update state with new phase
        self.update_state(job_id, |state| {
            state.phase = new_phase;

            // Handle phase-specific updates
            match new_phase {
                PhaseType::Completed => {
                    state.is_complete = true;
                    info!("Job {} completed successfully", job_id);
                }
                PhaseType::Failed => {
                    state.is_complete = true;
                    error!("Job {} failed", job_id);
                }
                _ => {}
            }

            Ok(())
        })
        .await?;

        debug!(
            "Job {} transitioned from {:?} to {:?}",
            job_id, old_phase, new_phase
        );

        Ok(())
    }

    /// Mark job as started (transition from Setup to Map)
    pub async fn mark_job_started(&self, job_id: &str) -> Result<(), StateError> {
        self.transition_to_phase(job_id, PhaseType::Map).await
    }

    /// Mark job as entering reduce phase
    pub async fn mark_reduce_started(&self, job_id: &str) -> Result<(), StateError> {
        self.transition_to_phase(job_id, PhaseType::Reduce).await
    }

    /// Mark job as completed
    pub async fn mark_job_completed(&self, job_id: &str) -> Result<(), StateError> {
        self.update_state(job_id, |state| {
            // Determine which phase we can complete from
            let valid_completion = matches!(state.phase, PhaseType::Map | PhaseType::Reduce);

            if !valid_completion {
                return Err(StateError::InvalidTransition {
                    from: state.phase,
                    to: PhaseType::Completed,
                });
            }

            state.phase = PhaseType::Completed;
            state.is_complete = true;
            Ok(())
        })
        .await?;

        self.log_event(StateEvent {
            timestamp: Utc::now(),
            event_type: StateEventType::JobCompleted,
            job_id: job_id.to_string(),
            details: None,
        })
        .await;

        info!("Job {} marked as completed", job_id);
        Ok(())
    }

    /// Mark job as failed
    pub async fn mark_job_failed(&self, job_id: &str, reason: String) -> Result<(), StateError> {
        self.update_state(job_id, |state| {
            // Can fail from any non-terminal state
            if state.phase == PhaseType::Completed || state.phase == PhaseType::Failed {
                return Err(StateError::InvalidTransition {
                    from: state.phase,
                    to: PhaseType::Failed,
                });
            }

            state.phase = PhaseType::Failed;
            state.is_complete = true;
            Ok(())
        })
        .await?;

        self.log_event(StateEvent {
            timestamp: Utc::now(),
            event_type: StateEventType::JobFailed {
                reason: reason.clone(),
            },
            job_id: job_id.to_string(),
            details: Some(reason),
        })
        .await;

        error!("Job {} marked as failed", job_id);
        Ok(())
    }

    /// Get valid next phases from current state
    pub async fn get_valid_transitions(&self, job_id: &str) -> Result<Vec<PhaseType>, StateError> {
        let state = self
            .get_state(job_id)
            .await?
            .ok_or_else(|| StateError::NotFound(job_id.to_string()))?;

        Ok(self.transitions.get_valid_transitions(state.phase))
    }

    /// Check if a specific transition is valid
    pub async fn can_transition(
        &self,
        job_id: &str,
        to_phase: PhaseType,
    ) -> Result<bool, StateError> {
        let state = self
            .get_state(job_id)
            .await?
            .ok_or_else(|| StateError::NotFound(job_id.to_string()))?;

        Ok(self.transitions.is_valid_transition(state.phase, to_phase))
    }
}

/// Extension methods for JobState phase management
impl JobState {
    /// Check if the job is in a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, PhaseType::Completed | PhaseType::Failed)
    }

    /// Check if the job can be resumed
    pub fn can_resume(&self) -> bool {
        !self.is_terminal() && self.checkpoint.is_some()
    }

    /// Check if the job is in the setup phase
    pub fn is_setup(&self) -> bool {
        matches!(self.phase, PhaseType::Setup)
    }

    /// Check if the job is in the map phase
    pub fn is_map(&self) -> bool {
        matches!(self.phase, PhaseType::Map)
    }

    /// Check if the job is in the reduce phase
    pub fn is_reduce(&self) -> bool {
        matches!(self.phase, PhaseType::Reduce)
    }

    /// Get a human-readable status string
    pub fn status_string(&self) -> String {
        match self.phase {
            PhaseType::Setup => "Setting up".to_string(),
            PhaseType::Map => format!(
                "Mapping ({}/{} items)",
                self.processed_items.len(),
                self.total_items
            ),
            PhaseType::Reduce => "Reducing results".to_string(),
            PhaseType::Completed => "Completed".to_string(),
            PhaseType::Failed => "Failed".to_string(),
        }
    }
}
