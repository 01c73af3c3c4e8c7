//! Shell command executor for goal-seeking operations

use anyhow::Result;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

use crate::cook::execution::{CommandExecutor, ExecutionContext, ExecutionResult};

/// Shell-based command executor for goal-seeking
pub struct ShellCommandExecutor;

impl Default for ShellCommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl ShellCommandExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandExecutor for ShellCommandExecutor {
    async fn execute(
        &self,
        command: &str,
        _args: &[String],
        context: ExecutionContext,
    ) -> Result<ExecutionResult> {
        // Parse the command string into shell command
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command);
        
        // Add environment variables from context
        for (key, value) in &context.env_vars {
            cmd.env(key, value);
        }
        
        // Set working directory if specified
        cmd.current_dir(&context.working_directory);
        
        // Configure stdio
        cmd.stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(Stdio::null());
        
        // Execute the command
        tracing::debug!("Executing shell command: sh -c '{}'", command);
        let output = cmd.output().await?;
        
        // Convert output to string
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        
        tracing::debug!("Shell output - stdout: '{}', stderr: '{}', status: {}", 
                       stdout, stderr, output.status.success());
        
        Ok(ExecutionResult {
            success: output.status.success(),
            stdout,
            stderr,
            exit_code: output.status.code(),
        })
    }
}
