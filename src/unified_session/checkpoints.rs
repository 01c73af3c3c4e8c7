//! Checkpoint management with pure functional operations

use super::state::{Checkpoint, CheckpointId, UnifiedSession};
use anyhow::Result;
use chrono::Utc;
use std::collections::HashMap;

/// Create a checkpoint from a session (pure function)
pub fn create_checkpoint_from_session(session: &UnifiedSession) -> Result<Checkpoint> {
    let checkpoint_state = serde_json::to_value(session)?;

    Ok(Checkpoint {
        id: CheckpointId::new(),
        created_at: Utc::now(),
        state: checkpoint_state,
        metadata: HashMap::new(),
    })
}

/// Find a checkpoint by ID (pure function)
pub fn find_checkpoint<'a>(
    checkpoints: &'a [Checkpoint],
    id: &CheckpointId,
) -> Option<&'a Checkpoint> {
    checkpoints.iter().find(|c| c.id == *id)
}

/// Restore session from checkpoint (pure function)
pub fn restore_session_from_checkpoint(checkpoint: &Checkpoint) -> Result<UnifiedSession> {
    let session: UnifiedSession = serde_json::from_value(checkpoint.state.clone())?;
    Ok(session)
}
