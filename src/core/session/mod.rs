//! Pure session state management functions
//!
//! These functions handle session state transformations without performing any I/O operations.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;

/// Session status
#[derive(Debug, Clone, PartialEq)]
pub enum SessionStatus {
    InProgress,
    Completed,
    Failed,
    Paused,
}

/// Session state
#[derive(Debug, Clone)]
pub struct SessionState {
    pub id: String,
    pub status: SessionStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub metadata: HashMap<String, Value>,
    pub iterations_completed: u32,
    pub files_changed: u32,
    pub current_step: usize,
    pub total_steps: usize,
    pub error: Option<String>,
}

/// Update types for session state
#[derive(Debug, Clone)]
pub enum SessionUpdate {
    Status(SessionStatus),
    Metadata(HashMap<String, Value>),
    Progress { current: usize, total: usize },
    Error(String),
    IncrementIteration,
    FilesChanged(u32),
}

/// Apply an update to session state (pure function)
pub fn apply_session_update(mut state: SessionState, update: SessionUpdate) -> SessionState {
    match update {
        SessionUpdate::Status(status) => {
            state.status = status.clone();
            if matches!(status, SessionStatus::Completed | SessionStatus::Failed) {
                state.completed_at = Some(Utc::now());
            }
        }
        SessionUpdate::Metadata(metadata) => {
            // Handle special metadata keys
            for (key, value) in metadata.iter() {
                match key.as_str() {
                    "files_changed_delta" => {
                        if let Some(count) = value.as_u64() {
                            state.files_changed += count as u32;
                        }
                    }
                    "increment_iteration" => {
                        if value.as_bool().unwrap_or(false) {
                            state.iterations_completed += 1;
                        }
                    }
                    _ => {}
                }
            }
            state.metadata.extend(metadata);
        }
        SessionUpdate::Progress { current, total } => {
            state.current_step = current;
            state.total_steps = total;
        }
        SessionUpdate::Error(error) => {
            state.error = Some(error);
            state.status = SessionStatus::Failed;
            state.completed_at = Some(Utc::now());
        }
        SessionUpdate::IncrementIteration => {
            state.iterations_completed += 1;
        }
        SessionUpdate::FilesChanged(count) => {
            state.files_changed += count;
        }
    }

    state
}

/// Calculate session duration
pub fn calculate_duration(
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
) -> chrono::Duration {
    let end_time = completed_at.unwrap_or_else(Utc::now);
    end_time - started_at
}

/// Format duration for display
pub fn format_duration(duration: chrono::Duration) -> String {
    let total_seconds = duration.num_seconds();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// Generate session summary
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub id: String,
    pub status: SessionStatus,
    pub duration: String,
    pub iterations: u32,
    pub files_changed: u32,
    pub progress_percentage: f64,
}

pub fn generate_session_summary(state: &SessionState) -> SessionSummary {
    let duration = calculate_duration(state.started_at, state.completed_at);
    let progress_percentage = if state.total_steps > 0 {
        (state.current_step as f64 / state.total_steps as f64) * 100.0
    } else {
        0.0
    };

    SessionSummary {
        id: state.id.clone(),
        status: state.status.clone(),
        duration: format_duration(duration),
        iterations: state.iterations_completed,
        files_changed: state.files_changed,
        progress_percentage,
    }
}

/// Filter sessions based on criteria
#[derive(Debug, Clone, Default)]
pub struct SessionFilter {
    pub status: Option<SessionStatus>,
    pub min_iterations: Option<u32>,
    pub max_iterations: Option<u32>,
    pub has_error: Option<bool>,
}

pub fn filter_sessions(sessions: &[SessionState], filter: &SessionFilter) -> Vec<SessionState> {
    sessions
        .iter()
        .filter(|s| {
            if let Some(status) = &filter.status {
                if s.status != *status {
                    return false;
                }
            }

            if let Some(min) = filter.min_iterations {
                if s.iterations_completed < min {
                    return false;
                }
            }

            if let Some(max) = filter.max_iterations {
                if s.iterations_completed > max {
                    return false;
                }
            }

            if let Some(has_error) = filter.has_error {
                if has_error != s.error.is_some() {
                    return false;
                }
            }

            true
        })
        .cloned()
        .collect()
}
