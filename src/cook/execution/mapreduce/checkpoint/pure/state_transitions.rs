//! Pure work item state machine
//!
//! This module contains pure functions for work item state transitions.
//! The state machine is fully deterministic and testable without I/O.

use crate::cook::execution::mapreduce::agent::AgentResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Work item status for state machine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WorkItemStatus {
    /// Item has not been started
    Pending,
    /// Item is currently being processed
    InProgress {
        agent_id: String,
        started_at: DateTime<Utc>,
    },
    /// Item completed successfully
    Completed { result: Box<AgentResult> },
    /// Item failed and may be retried
    Failed { error: String, retry_count: usize },
    /// Item exhausted retries and is in DLQ
    DeadLettered {
        error: String,
        retry_count: usize,
        dlq_at: DateTime<Utc>,
    },
}

impl WorkItemStatus {
    /// Get the status discriminant for comparison
    pub fn discriminant(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress { .. } => "InProgress",
            Self::Completed { .. } => "Completed",
            Self::Failed { .. } => "Failed",
            Self::DeadLettered { .. } => "DeadLettered",
        }
    }

    /// Check if this status matches another (by discriminant)
    pub fn matches(&self, other: &Self) -> bool {
        self.discriminant() == other.discriminant()
    }
}

impl WorkItemStatus {
    /// Check if the item can be retried
    pub fn can_retry(&self, max_retries: usize) -> bool {
        match self {
            Self::Failed { retry_count, .. } => *retry_count < max_retries,
            _ => false,
        }
    }

    /// Check if the item is in a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::DeadLettered { .. })
    }

    /// Check if the item needs processing
    pub fn needs_processing(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum WorkItemEvent {
    /// Agent started processing the item
    AgentStart { agent_id: String },
    /// Agent completed successfully
    AgentComplete { result: Box<AgentResult> },
    /// Agent failed with an error
    AgentFailed { error: String },
    /// Workflow was interrupted
    Interrupt,
    /// Item should be retried
    Retry,
    /// Item should be moved to DLQ (max retries exhausted)
    MoveToDeadLetter,
}

/// Error during state transition
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransitionError {
    #[error("Invalid transition from {current} with event {event}")]
    Invalid { current: String, event: String },
}

/// Pure: Transition work item state
///
/// Applies a state transition based on the current state and event.
/// Returns the new state or an error if the transition is invalid.
///
/// # State Machine
///
/// ```text
/// ┌─────────┐  agent_start   ┌────────────┐
/// │ Pending │ ─────────────> │ InProgress │
/// └────┬────┘                └──────┬─────┘
///      ^                            │
///      │                            │ agent_complete
///      │ interrupt/                 v
///      │ retry        ┌──────────┐  │    ┌────────┐
///      └──────────────┤ Completed│ <─────┤ Failed │
///                     └──────────┘       └────┬───┘
///                                              │
///                                              v (max retries)
///                                        ┌────────────┐
///                                        │DeadLettered│
///                                        └────────────┘
/// ```
pub fn transition_work_item(
    current: WorkItemStatus,
    event: WorkItemEvent,
) -> Result<WorkItemStatus, TransitionError> {
    match (&current, &event) {
        // Pending -> InProgress
        (WorkItemStatus::Pending, WorkItemEvent::AgentStart { agent_id }) => {
            Ok(WorkItemStatus::InProgress {
                agent_id: agent_id.clone(),
                started_at: Utc::now(),
            })
        }

        // InProgress -> Completed
        (WorkItemStatus::InProgress { .. }, WorkItemEvent::AgentComplete { result }) => {
            Ok(WorkItemStatus::Completed {
                result: result.clone(),
            })
        }

        // InProgress -> Failed
        (WorkItemStatus::InProgress { .. }, WorkItemEvent::AgentFailed { error }) => {
            Ok(WorkItemStatus::Failed {
                error: error.clone(),
                retry_count: 1,
            })
        }

        // InProgress -> Pending (on interrupt)
        (WorkItemStatus::InProgress { .. }, WorkItemEvent::Interrupt) => {
            Ok(WorkItemStatus::Pending)
        }

        // Failed -> Pending (on retry)
        (WorkItemStatus::Failed { .. }, WorkItemEvent::Retry) => {
            // Reset to pending for retry
            Ok(WorkItemStatus::Pending)
        }

        // Failed -> DeadLettered
        (
            WorkItemStatus::Failed {
                error, retry_count, ..
            },
            WorkItemEvent::MoveToDeadLetter,
        ) => Ok(WorkItemStatus::DeadLettered {
            error: error.clone(),
            retry_count: *retry_count,
            dlq_at: Utc::now(),
        }),

        // Failed -> Failed (increment retry count on another failure after retry)
        (
            WorkItemStatus::Failed {
                retry_count,
                error: _,
            },
            WorkItemEvent::AgentFailed { error },
        ) => Ok(WorkItemStatus::Failed {
            error: error.clone(),
            retry_count: retry_count + 1,
        }),

        // Invalid transitions
        _ => Err(TransitionError::Invalid {
            current: format!("{:?}", current),
            event: format!("{:?}", event),
        }),
    }
}

/// Pure: Apply interrupt to all in-progress items
///
/// Resets all in-progress items back to pending for resume.
pub fn apply_interrupt_to_all<I>(statuses: I) -> Vec<(String, WorkItemStatus)>
where
    I: IntoIterator<Item = (String, WorkItemStatus)>,
{
    statuses
        .into_iter()
        .map(|(id, status)| {
            let new_status = match status {
                WorkItemStatus::InProgress { .. } => WorkItemStatus::Pending,
                other => other,
            };
            (id, new_status)
        })
        .collect()
}

/// Pure: Count items by status
pub fn count_by_status<'a, I>(statuses: I) -> StatusCounts
where
    I: IntoIterator<Item = &'a WorkItemStatus>,
{
    let mut counts = StatusCounts::default();
    for status in statuses {
        match status {
            WorkItemStatus::Pending => counts.pending += 1,
            WorkItemStatus::InProgress { .. } => counts.in_progress += 1,
            WorkItemStatus::Completed { .. } => counts.completed += 1,
            WorkItemStatus::Failed { .. } => counts.failed += 1,
            WorkItemStatus::DeadLettered { .. } => counts.dead_lettered += 1,
        }
    }
    counts
}

/// Counts of items in each status
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub failed: usize,
    pub dead_lettered: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.pending + self.in_progress + self.completed + self.failed + self.dead_lettered
    }
}
