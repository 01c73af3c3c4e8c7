use std::sync::Arc;
use uuid::Uuid;

use crate::{claude::ClaudeManager, simple_state::StateManager, workflow::WorkflowEngine, Result};

use super::{
    config::LoopConfig,
    metrics::LoopMetrics,
    session::{LoopSession, SessionState},
};

/// Main iterative improvement loop engine
pub struct IterationEngine {
    #[allow(dead_code)]
    workflow_engine: Arc<WorkflowEngine>,
    #[allow(dead_code)]
    claude_manager: Arc<ClaudeManager>,
    #[allow(dead_code)]
    state_manager: Arc<StateManager>,
}

impl IterationEngine {
    pub fn new(
        workflow_engine: Arc<WorkflowEngine>,
        claude_manager: Arc<ClaudeManager>,
        state_manager: Arc<StateManager>,
    ) -> Self {
        Self {
            workflow_engine,
            claude_manager,
            state_manager,
        }
    }

    /// Create a new loop session
    pub async fn create_session(&self, config: LoopConfig) -> Result<LoopSession> {
        // Create baseline metrics
        let session_id = Uuid::new_v4();
        let baseline_metrics = LoopMetrics::new(session_id, 0);

        let mut session = LoopSession::new(config, baseline_metrics);
        session.update_status(SessionState::Initializing);

        // Store session in database
        self.store_session(&session).await?;

        Ok(session)
    }

    /// Get an existing session
    pub async fn get_session(&self, session_id: &str) -> Result<LoopSession> {
        let uuid = Uuid::parse_str(session_id)
            .map_err(|_| crate::Error::Config("Invalid session ID".to_string()))?;

        self.load_session(&uuid)
            .await?
            .ok_or_else(|| crate::Error::NotFound(format!("Session {session_id} not found")))
    }

    /// Update session with review results
    pub async fn update_session_review(
        &self,
        session_id: &str,
        iteration: u32,
        review_data: &super::session::ReviewData,
    ) -> Result<()> {
        let mut session = self.get_session(session_id).await?;

        // Create iteration data with review results
        let iteration_data = super::session::IterationData {
            id: Uuid::new_v4(),
            session_id: session.id,
            iteration_number: iteration,
            review_results: Some(review_data.clone()),
            improvement_results: None,
            validation_results: None,
            metrics: LoopMetrics::new(session.id, iteration),
            duration: std::time::Duration::default(),
            created_at: chrono::Utc::now(),
            completed_at: None,
            error: None,
        };

        session.add_iteration(iteration_data);
        self.store_session(&session).await?;

        Ok(())
    }

    /// Store session in database
    async fn store_session(&self, session: &LoopSession) -> Result<()> {
        // This would integrate with the state manager to store session data
        // For now, this is a placeholder
        tracing::info!("Storing loop session: {}", session.id);
        Ok(())
    }

    /// Load session from database
    async fn load_session(&self, session_id: &Uuid) -> Result<Option<LoopSession>> {
        // This would integrate with the state manager to load session data
        // For now, this is a placeholder
        tracing::info!("Loading loop session: {}", session_id);
        Ok(None)
    }
}
