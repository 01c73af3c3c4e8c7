//! Command runner implementation

use super::{CommandExecutor, ExecutionContext, ExecutionResult};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

/// Trait for running system commands
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command and return output
    async fn run_command(&self, cmd: &str, args: &[String]) -> Result<std::process::Output>;

    /// Run a command with full control
    async fn run_with_context(
        &self,
        cmd: &str,
        args: &[String],
        context: &ExecutionContext,
    ) -> Result<ExecutionResult>;
}

/// Real implementation of command runner
pub struct RealCommandRunner;

impl RealCommandRunner {
    /// Create a new command runner
    pub fn new() -> Self {
        Self
    }
}

impl Default for RealCommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandRunner for RealCommandRunner {
    async fn run_command(&self, cmd: &str, args: &[String]) -> Result<std::process::Output> {
        Command::new(cmd)
            .args(args)
            .output()
            .await
            .context(format!("Failed to execute command: {}", cmd))
    }

    async fn run_with_context(
        &self,
        cmd: &str,
        args: &[String],
        context: &ExecutionContext,
    ) -> Result<ExecutionResult> {
        let mut command = Command::new(cmd);
        command.args(args);
        command.current_dir(&context.working_directory);

        // Set environment variables
        for (key, value) in &context.env_vars {
            command.env(key, value);
        }

        // Configure output capture
        if context.capture_output {
            command.stdout(Stdio::piped());
            command.stderr(Stdio::piped());
        }

        // Execute with timeout if specified
        let output = if let Some(timeout) = context.timeout_seconds {
            tokio::time::timeout(std::time::Duration::from_secs(timeout), command.output())
                .await
                .context("Command timed out")??
        } else {
            command.output().await?
        };

        Ok(ExecutionResult {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code(),
        })
    }
}

#[async_trait]
impl CommandExecutor for RealCommandRunner {
    async fn execute(
        &self,
        command: &str,
        args: &[String],
        context: ExecutionContext,
    ) -> Result<ExecutionResult> {
        self.run_with_context(command, args, &context).await
    }
}
