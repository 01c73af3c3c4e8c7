//! Effect-based I/O operations for state management
//!
//! All I/O operations are wrapped in Effect types, enabling lazy evaluation,
//! composition, and easy testing with mock environments.

use super::pure;
use super::types::MapReduceJobState;
use crate::cook::execution::mapreduce::AgentResult;
use anyhow::{Context as AnyhowContext, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use stillwater::Effect;

/// Storage backend trait for checkpoint persistence
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    async fn write_checkpoint(&self, job_id: &str, data: &str) -> Result<()>;
    async fn read_checkpoint(&self, job_id: &str) -> Result<String>;
}

/// Event log trait for tracking state changes
#[async_trait::async_trait]
pub trait EventLog: Send + Sync {
    async fn log_checkpoint_saved(&self, job_id: &str) -> Result<()>;
    async fn log_phase_transition(&self, job_id: &str, phase: &str) -> Result<()>;
}

/// Environment for state I/O operations
pub struct StateEnv {
    pub storage: Arc<dyn StorageBackend>,
    pub event_log: Arc<dyn EventLog>,
}

/// Type alias for state effects
pub type StateEffect<T> = Effect<T, anyhow::Error, StateEnv>;

/// Save checkpoint (I/O wrapper)
pub fn save_checkpoint(state: MapReduceJobState) -> StateEffect<()> {
    Effect::from_async(|env: &StateEnv| async move {
        let serialized = serde_json::to_string_pretty(&state)
            .with_context(|| "Failed to serialize job state")?;

        env.storage
            .write_checkpoint(&state.job_id, &serialized)
            .await?;

        // Log event
        env.event_log.log_checkpoint_saved(&state.job_id).await?;

        Ok(())
    })
}

/// Load checkpoint (I/O)
pub fn load_checkpoint(job_id: String) -> StateEffect<MapReduceJobState> {
    Effect::from_async(move |env: &StateEnv| async move {
        let data = env.storage.read_checkpoint(&job_id).await?;
        let state: MapReduceJobState =
            serde_json::from_str(&data).with_context(|| "Failed to deserialize job state")?;
        Ok(state)
    })
}

/// Update state and save (composition of pure + I/O)
pub fn update_with_agent_result(
    state: MapReduceJobState,
    result: AgentResult,
) -> StateEffect<MapReduceJobState> {
    // Pure state update
    let new_state = pure::apply_agent_result(state, result);

    // Save updated state
    save_checkpoint(new_state.clone()).map(move |_| new_state.clone())
}

/// Complete agent batch (pure + I/O composition)
pub fn complete_batch(
    state: MapReduceJobState,
    results: Vec<AgentResult>,
) -> StateEffect<MapReduceJobState> {
    // Pure: apply all results
    let mut new_state = state;
    for result in results {
        new_state = pure::apply_agent_result(new_state, result);
    }

    // I/O: save checkpoint
    save_checkpoint(new_state.clone()).and_then(move |_| {
        // Pure: check if transition needed
        if pure::should_transition_to_reduce(&new_state) {
            transition_to_reduce(new_state)
        } else {
            Effect::pure(new_state)
        }
    })
}

/// Transition to reduce phase (I/O)
fn transition_to_reduce(state: MapReduceJobState) -> StateEffect<MapReduceJobState> {
    // Pure state update
    let new_state = pure::start_reduce_phase(state);

    let effect = Effect::from_async(move |env: &StateEnv| async move {
        // Log phase transition
        env.event_log
            .log_phase_transition(&new_state.job_id, "reduce")
            .await?;

        Ok(new_state.clone())
    });

    effect.and_then(|s| save_checkpoint(s.clone()).map(move |_| s))
}

/// Start reduce phase with save
pub fn start_reduce_phase_with_save(state: MapReduceJobState) -> StateEffect<MapReduceJobState> {
    let new_state = pure::start_reduce_phase(state);
    save_checkpoint(new_state.clone()).map(move |_| new_state.clone())
}

/// Complete reduce phase with save
pub fn complete_reduce_phase_with_save(
    state: MapReduceJobState,
    output: Option<String>,
) -> StateEffect<MapReduceJobState> {
    let new_state = pure::complete_reduce_phase(state, output);
    save_checkpoint(new_state.clone()).map(move |_| new_state.clone())
}

/// Mark job complete with save
pub fn mark_complete_with_save(state: MapReduceJobState) -> StateEffect<MapReduceJobState> {
    let new_state = pure::mark_complete(state);
    save_checkpoint(new_state.clone()).map(move |_| new_state.clone())
}

/// Mark setup complete with save
pub fn mark_setup_complete_with_save(
    state: MapReduceJobState,
    output: Option<String>,
) -> StateEffect<MapReduceJobState> {
    let new_state = pure::mark_setup_complete(state, output);
    save_checkpoint(new_state.clone()).map(move |_| new_state.clone())
}

/// Update variables with save
pub fn update_variables_with_save(
    state: MapReduceJobState,
    variables: HashMap<String, Value>,
) -> StateEffect<MapReduceJobState> {
    let new_state = pure::update_variables(state, variables);
    save_checkpoint(new_state.clone()).map(move |_| new_state.clone())
}

/// Set parent worktree with save
pub fn set_parent_worktree_with_save(
    state: MapReduceJobState,
    worktree: Option<String>,
) -> StateEffect<MapReduceJobState> {
    let new_state = pure::set_parent_worktree(state, worktree);
    save_checkpoint(new_state.clone()).map(move |_| new_state.clone())
}
