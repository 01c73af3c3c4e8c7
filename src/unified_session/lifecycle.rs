//! Session lifecycle management with pure state transition logic

use super::state::{SessionStatus, UnifiedSession};
use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, Utc};

/// Represents a status transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)] // Used in tests, available for future functional refactoring
pub enum Transition {
    Start,
    Pause,
    Resume,
    Complete,
    Fail,
}

/// Validate a status transition
pub fn validate_transition(from: &SessionStatus, to: &SessionStatus) -> Result<()> {
    use SessionStatus::*;

    let valid = match (from, to) {
        // From Initializing - allow transitions to any non-initializing state
        (Initializing, Running) => true,
        (Initializing, Paused) => true,    // For migration support
        (Initializing, Completed) => true, // Allow direct completion
        (Initializing, Failed) => true,

        // From Running
        (Running, Paused) => true,
        (Running, Completed) => true,
        (Running, Failed) => true,

        // From Paused
        (Paused, Running) => true,
        (Paused, Failed) => true,
        (Paused, Completed) => true,

        // From Failed - allow resume (retry failed workflows)
        (Failed, Running) => true,

        // Same status is always valid (idempotent)
        (a, b) if a == b => true,

        // Terminal states cannot transition (except Failed -> Running above)
        (Completed, _) => false,
        (Cancelled, _) => false,

        // All other transitions are invalid
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(anyhow!(
            "Invalid status transition from {:?} to {:?}",
            from,
            to
        ))
    }
}

/// Apply a status transition to get the new status
#[allow(dead_code)] // Used in tests, available for future functional refactoring
pub fn transition_status(current: &SessionStatus, transition: Transition) -> Result<SessionStatus> {
    let new_status = match transition {
        Transition::Start => SessionStatus::Running,
        Transition::Pause => SessionStatus::Paused,
        Transition::Resume => SessionStatus::Running,
        Transition::Complete => SessionStatus::Completed,
        Transition::Fail => SessionStatus::Failed,
    };

    validate_transition(current, &new_status)?;
    Ok(new_status)
}

/// Calculate session duration
#[allow(dead_code)] // Used in tests, available for future functional refactoring
pub fn calculate_duration(
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
) -> Option<Duration> {
    completed_at.map(|end| end.signed_duration_since(started_at))
}

/// Apply a status update to a session (pure function)
pub fn apply_status_update(session: &mut UnifiedSession, status: SessionStatus) -> Result<()> {
    validate_transition(&session.status, &status)?;

    // Clear completed_at when resuming from Failed
    if session.status == SessionStatus::Failed && status == SessionStatus::Running {
        session.completed_at = None;
    }

    session.status = status;
    session.updated_at = Utc::now();

    if matches!(
        session.status,
        SessionStatus::Completed | SessionStatus::Failed
    ) {
        session.completed_at = Some(Utc::now());
    }

    Ok(())
}
