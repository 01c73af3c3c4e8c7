//! Pure functions for applying session updates

use super::state::{Checkpoint, CheckpointId, UnifiedSession};
use chrono::Utc;
use std::collections::HashMap;
use std::time::Duration;

/// Apply metadata update to session (pure function)
pub fn apply_metadata_update(
    session: &mut UnifiedSession,
    metadata: HashMap<String, serde_json::Value>,
) {
    // Handle special metadata keys
    for (key, value) in metadata.iter() {
        match key.as_str() {
            "files_changed_delta" => {
                if let Some(count) = value.as_u64() {
                    if let Some(workflow) = &mut session.workflow_data {
                        workflow.files_changed += count as u32;
                    }
                }
            }
            "increment_iteration" => {
                if value.as_bool().unwrap_or(false) {
                    if let Some(workflow) = &mut session.workflow_data {
                        workflow.iterations_completed += 1;
                    }
                }
            }
            _ => {}
        }
    }
    session.metadata.extend(metadata);
}

/// Apply checkpoint state update to session (pure function)
pub fn apply_checkpoint_update(
    session: &mut UnifiedSession,
    state: serde_json::Value,
) -> Checkpoint {
    let checkpoint = Checkpoint {
        id: CheckpointId::new(),
        created_at: Utc::now(),
        state,
        metadata: HashMap::new(),
    };
    session.checkpoints.push(checkpoint.clone());
    checkpoint
}

/// Apply error update to session (pure function)
pub fn apply_error_update(session: &mut UnifiedSession, error: String) {
    session.error = Some(error);
    session.status = super::state::SessionStatus::Failed;
}

/// Apply progress update to session (pure function)
pub fn apply_progress_update(session: &mut UnifiedSession, current: usize, total: usize) {
    if let Some(workflow) = &mut session.workflow_data {
        workflow.current_step = current;
        workflow.total_steps = total;
    } else if let Some(mapreduce) = &mut session.mapreduce_data {
        mapreduce.processed_items = current;
        mapreduce.total_items = total;
    }
}

/// Apply timing update to session (pure function)
pub fn apply_timing_update(session: &mut UnifiedSession, operation: String, duration: Duration) {
    session.timings.insert(operation, duration);
}
