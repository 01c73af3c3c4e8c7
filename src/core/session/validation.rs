//! Pure state transition validation for session status
//!
//! This module provides deterministic validation of session status transitions.
//! All functions are pure (no I/O, no side effects) and can be tested without mocking.
//!
//! # Valid State Transitions
//!
//! ```text
//!     Initializing
//!         │
//!         ▼
//!       Running ──────────────────┐
//!         │                       │
//!    ┌────┼────┐                  │
//!    │    │    │                  │
//!    ▼    ▼    ▼                  │
//! Paused Completed Failed         │
//!    │                            │
//!    ├──────────────────►Running──┘
//!    │
//!    ▼
//! Cancelled
//! ```

use crate::unified_session::SessionStatus;
use std::fmt;

/// Error type for session state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionTransitionError {
    /// Invalid state transition attempted
    InvalidTransition {
        from: SessionStatus,
        to: SessionStatus,
    },
}

impl fmt::Display for SessionTransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionTransitionError::InvalidTransition { from, to } => {
                write!(f, "Invalid session transition from {:?} to {:?}", from, to)
            }
        }
    }
}

impl std::error::Error for SessionTransitionError {}

/// Pure: Validate status transition
///
/// Returns Ok(()) if the transition is valid, otherwise returns an error
/// describing the invalid transition.
///
/// # Valid Transitions
///
/// - Initializing → Running
/// - Running → Paused
/// - Running → Completed
/// - Running → Failed
/// - Paused → Running
/// - Paused → Cancelled
///
/// # Examples
///
/// ```
/// use prodigy::core::session::validation::validate_status_transition;
/// use prodigy::unified_session::SessionStatus;
///
/// // Valid transition
/// assert!(validate_status_transition(&SessionStatus::Initializing, &SessionStatus::Running).is_ok());
///
/// // Invalid transition
/// assert!(validate_status_transition(&SessionStatus::Completed, &SessionStatus::Running).is_err());
/// ```
pub fn validate_status_transition(
    from: &SessionStatus,
    to: &SessionStatus,
) -> Result<(), SessionTransitionError> {
    use SessionStatus::*;

    let valid = matches!(
        (from, to),
        (Initializing, Running)
            | (Running, Paused)
            | (Running, Completed)
            | (Running, Failed)
            | (Paused, Running)
            | (Paused, Cancelled)
    );

    if valid {
        Ok(())
    } else {
        Err(SessionTransitionError::InvalidTransition {
            from: from.clone(),
            to: to.clone(),
        })
    }
}

/// Pure: Check if a status is terminal (no further transitions allowed)
///
/// Terminal statuses are: Completed, Failed, Cancelled
pub fn is_terminal_status(status: &SessionStatus) -> bool {
    matches!(
        status,
        SessionStatus::Completed | SessionStatus::Failed | SessionStatus::Cancelled
    )
}

/// Pure: Get all valid transitions from a given status
///
/// Returns a list of statuses that can be transitioned to from the given status.
pub fn valid_transitions_from(status: &SessionStatus) -> Vec<SessionStatus> {
    use SessionStatus::*;
    match status {
        Initializing => vec![Running],
        Running => vec![Paused, Completed, Failed],
        Paused => vec![Running, Cancelled],
        Completed | Failed | Cancelled => vec![],
    }
}
