//! Phase orchestration for MapReduce execution
//!
//! This module manages the orchestration of different phases
//! in MapReduce execution, ensuring proper sequencing and coordination.

use crate::cook::execution::errors::MapReduceResult;
use crate::cook::execution::mapreduce::{
    agent::AgentResult,
    types::{MapPhase, ReducePhase, SetupPhase},
};
use crate::cook::orchestrator::ExecutionEnvironment;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// Trait for phase execution
#[async_trait]
pub trait PhaseExecutor {
    /// Execute a phase and return results
    async fn execute(&self, env: &ExecutionEnvironment) -> MapReduceResult<PhaseResult>;

    /// Get phase name
    fn name(&self) -> &str;

    /// Check if phase can be skipped
    fn can_skip(&self) -> bool {
        false
    }
}

/// Result from phase execution
#[derive(Debug)]
pub enum PhaseResult {
    /// Setup phase completed
    Setup,
    /// Map phase completed with results
    Map(Vec<AgentResult>),
    /// Reduce phase completed
    Reduce,
}

/// Orchestrator for managing phase execution
pub struct PhaseOrchestrator {
    phases: Vec<Box<dyn PhaseExecutor + Send + Sync>>,
}

impl Default for PhaseOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseOrchestrator {
    /// Create a new orchestrator
    pub fn new() -> Self {
        Self { phases: Vec::new() }
    }

    /// Add a phase to the orchestrator
    pub fn add_phase(&mut self, phase: Box<dyn PhaseExecutor + Send + Sync>) {
        self.phases.push(phase);
    }

    /// Execute all phases in sequence
    pub async fn execute_all(
        &self,
        env: &ExecutionEnvironment,
    ) -> MapReduceResult<Vec<PhaseResult>> {
        let mut results = Vec::new();

        for phase in &self.phases {
            if phase.can_skip() {
                debug!("Skipping phase: {}", phase.name());
                continue;
            }

            info!("Executing phase: {}", phase.name());
            let result = phase.execute(env).await?;
            results.push(result);
        }

        Ok(results)
    }

    /// Execute phases with checkpoint support
    pub async fn execute_with_checkpoints(
        &self,
        env: &ExecutionEnvironment,
        checkpoint_fn: impl Fn(&str, &PhaseResult) -> MapReduceResult<()>,
    ) -> MapReduceResult<Vec<PhaseResult>> {
        let mut results = Vec::new();

        for phase in &self.phases {
            if phase.can_skip() {
                continue;
            }

            info!("Executing phase with checkpoint: {}", phase.name());
            let result = phase.execute(env).await?;

            // Save checkpoint after each phase
            checkpoint_fn(phase.name(), &result)?;

            results.push(result);
        }

        Ok(results)
    }
}

/// Setup phase executor
pub struct SetupExecutor {
    _phase: SetupPhase,
}

impl SetupExecutor {
    /// Create a new setup executor
    pub fn new(phase: SetupPhase) -> Self {
        Self { _phase: phase }
    }
}

#[async_trait]
impl PhaseExecutor for SetupExecutor {
    async fn execute(&self, _env: &ExecutionEnvironment) -> MapReduceResult<PhaseResult> {
        debug!("Executing setup phase");
        // Implementation would execute setup commands
        Ok(PhaseResult::Setup)
    }

    fn name(&self) -> &str {
        "setup"
    }

    fn can_skip(&self) -> bool {
        self._phase.commands.is_empty()
    }
}

/// Map phase executor
pub struct MapExecutor {
    _phase: Arc<MapPhase>,
}

impl MapExecutor {
    /// Create a new map executor
    pub fn new(phase: Arc<MapPhase>) -> Self {
        Self { _phase: phase }
    }
}

#[async_trait]
impl PhaseExecutor for MapExecutor {
    async fn execute(&self, _env: &ExecutionEnvironment) -> MapReduceResult<PhaseResult> {
        debug!("Executing map phase");
        // Implementation would execute map operations
        Ok(PhaseResult::Map(Vec::new()))
    }

    fn name(&self) -> &str {
        "map"
    }
}

/// Reduce phase executor
pub struct ReduceExecutor {
    _phase: ReducePhase,
    map_results: Vec<AgentResult>,
}

impl ReduceExecutor {
    /// Create a new reduce executor
    pub fn new(phase: ReducePhase, map_results: Vec<AgentResult>) -> Self {
        Self {
            _phase: phase,
            map_results,
        }
    }
}

#[async_trait]
impl PhaseExecutor for ReduceExecutor {
    async fn execute(&self, _env: &ExecutionEnvironment) -> MapReduceResult<PhaseResult> {
        debug!(
            "Executing reduce phase with {} results",
            self.map_results.len()
        );
        // Implementation would execute reduce operations
        Ok(PhaseResult::Reduce)
    }

    fn name(&self) -> &str {
        "reduce"
    }

    fn can_skip(&self) -> bool {
        self._phase.commands.is_empty() || self.map_results.is_empty()
    }
}
