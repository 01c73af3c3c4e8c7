//! Pure predicate functions for session filtering

use super::state::{SessionFilter, SessionStatus, SessionType, UnifiedSession};
use chrono::{DateTime, Utc};

/// Check if session matches status filter (pure predicate)
pub fn matches_status_filter(session: &UnifiedSession, filter: &Option<SessionStatus>) -> bool {
    match filter {
        Some(status) => session.status == *status,
        None => true,
    }
}

/// Check if session matches type filter (pure predicate)
pub fn matches_type_filter(session: &UnifiedSession, filter: &Option<SessionType>) -> bool {
    let session_type = if session.workflow_data.is_some() {
        SessionType::Workflow
    } else {
        SessionType::MapReduce
    };

    match filter {
        Some(filter_type) => session_type == *filter_type,
        None => true,
    }
}

/// Check if session matches time filter (pure predicate)
pub fn matches_time_filter(
    session: &UnifiedSession,
    after: &Option<DateTime<Utc>>,
    before: &Option<DateTime<Utc>>,
) -> bool {
    let after_check = match after {
        Some(time) => session.started_at >= *time,
        None => true,
    };

    let before_check = match before {
        Some(time) => session.started_at <= *time,
        None => true,
    };

    after_check && before_check
}

/// Check if session matches worktree filter (pure predicate)
pub fn matches_worktree_filter(session: &UnifiedSession, worktree_name: &Option<String>) -> bool {
    match worktree_name {
        Some(name) => {
            if let Some(workflow_data) = &session.workflow_data {
                workflow_data.worktree_name.as_ref() == Some(name)
            } else {
                false
            }
        }
        None => true,
    }
}

/// Apply session filter (pure predicate combining all filters)
pub fn apply_session_filter(session: &UnifiedSession, filter: &SessionFilter) -> bool {
    matches_status_filter(session, &filter.status)
        && matches_type_filter(session, &filter.session_type)
        && matches_time_filter(session, &filter.after, &filter.before)
        && matches_worktree_filter(session, &filter.worktree_name)
}
