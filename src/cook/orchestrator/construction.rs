//! Orchestrator construction and configuration
//!
//! This module contains factory methods and configuration builders for creating
//! DefaultCookOrchestrator instances.

use crate::abstractions::git::GitOperations;
use crate::config::WorkflowConfig;
use crate::cook::command::CookCommand;
use crate::cook::execution::{ClaudeExecutor, CommandExecutor};
use crate::cook::interaction::UserInteraction;
use crate::cook::session::SessionManager;
use crate::testing::config::TestConfiguration;
use std::path::PathBuf;
use std::sync::Arc;

use super::core::DefaultCookOrchestrator;

/// Create a new orchestrator with dependencies
#[allow(clippy::too_many_arguments)]
pub fn new_orchestrator(
    session_manager: Arc<dyn SessionManager>,
    command_executor: Arc<dyn CommandExecutor>,
    claude_executor: Arc<dyn ClaudeExecutor>,
    user_interaction: Arc<dyn UserInteraction>,
    git_operations: Arc<dyn GitOperations>,
    subprocess: crate::subprocess::SubprocessManager,
) -> DefaultCookOrchestrator {
    DefaultCookOrchestrator::new(
        session_manager,
        command_executor,
        claude_executor,
        user_interaction,
        git_operations,
        subprocess,
    )
}

/// Create a new orchestrator with test configuration
#[allow(clippy::too_many_arguments)]
pub fn new_orchestrator_with_test_config(
    session_manager: Arc<dyn SessionManager>,
    command_executor: Arc<dyn CommandExecutor>,
    claude_executor: Arc<dyn ClaudeExecutor>,
    user_interaction: Arc<dyn UserInteraction>,
    git_operations: Arc<dyn GitOperations>,
    subprocess: crate::subprocess::SubprocessManager,
    test_config: Arc<TestConfiguration>,
) -> DefaultCookOrchestrator {
    DefaultCookOrchestrator::with_test_config(
        session_manager,
        command_executor,
        claude_executor,
        user_interaction,
        git_operations,
        subprocess,
        test_config,
    )
}

/// Create environment configuration from workflow config
pub fn create_env_config(workflow: &WorkflowConfig) -> crate::cook::environment::EnvironmentConfig {
    crate::cook::environment::EnvironmentConfig {
        global_env: workflow
            .env
            .as_ref()
            .map(|env| {
                env.iter()
                    .map(|(k, v)| {
                        (
                            k.clone(),
                            crate::cook::environment::EnvValue::Static(v.clone()),
                        )
                    })
                    .collect()
            })
            .unwrap_or_default(),
        secrets: workflow.secrets.clone().unwrap_or_default(),
        env_files: workflow.env_files.clone().unwrap_or_default(),
        inherit: true,
        profiles: workflow.profiles.clone().unwrap_or_default(),
        active_profile: None,
    }
}

/// Create workflow executor instance
pub fn create_workflow_executor(
    claude_executor: Arc<dyn ClaudeExecutor>,
    session_manager: Arc<dyn SessionManager>,
    user_interaction: Arc<dyn UserInteraction>,
    playbook_path: PathBuf,
) -> crate::cook::workflow::WorkflowExecutorImpl {
    crate::cook::workflow::WorkflowExecutorImpl::new(
        claude_executor,
        session_manager,
        user_interaction,
    )
    .with_workflow_path(playbook_path)
}

/// Create base workflow state components for session management
pub fn create_workflow_state_base(command: &CookCommand) -> (PathBuf, Vec<String>, Vec<String>) {
    (
        command.playbook.clone(),
        command.args.clone(),
        command.map.clone(),
    )
}

/// Generate a new session ID
pub fn generate_session_id() -> String {
    crate::unified_session::SessionId::new().to_string()
}
