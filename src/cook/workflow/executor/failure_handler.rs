//! Failure handling and retry logic for workflow execution
//!
//! This module contains failure recovery strategies and retry mechanisms extracted
//! from WorkflowExecutor. It implements exponential backoff, jitter, and configurable
//! retry policies.
//!
//! ## Key Components
//!
//! - **Retry Logic**: Exponential backoff with jitter
//! - **Failure Handlers**: on_failure command execution
//! - **Recovery Strategies**: Logging vs Recovery mode
//! - **Error Matching**: Selective retry based on error patterns
//!
//! ## Design Principles
//!
//! 1. **Separation of Concerns**: Retry logic independent of command execution
//! 2. **Pure Retry Calculation**: Backoff delays are pure functions
//! 3. **Flexible Configuration**: Support multiple retry strategies
//! 4. **Observable**: Detailed logging and state tracking

use crate::cook::retry_state::RetryAttempt;
use crate::cook::retry_v2::{RetryConfig, RetryExecutor};
use crate::cook::workflow::on_failure::{HandlerStrategy, OnFailureConfig};
use std::time::Duration;

use super::StepResult;

// ============================================================================
// Pure Retry Calculation Functions
// ============================================================================

/// Calculate delay for a retry attempt with exponential backoff
///
/// This is a pure function that calculates delays deterministically.
/// Actual jitter is applied separately for testing purposes.
pub fn calculate_retry_delay(retry_config: &RetryConfig, attempt: u32) -> Duration {
    let executor = RetryExecutor::new(retry_config.clone());
    executor.calculate_delay(attempt)
}

/// Apply jitter to a delay duration
///
/// Adds randomness to prevent thundering herd problems.
#[allow(deprecated)] // rand::thread_rng deprecated in favor of rand::rng
pub fn apply_jitter(delay: Duration, jitter_factor: f64) -> Duration {
    use rand::Rng;
    let mut rng = rand::rng();
    let jitter_range = delay.as_secs_f64() * jitter_factor;
    let jitter = rng.random_range(-jitter_range..=jitter_range);
    let adjusted = delay.as_secs_f64() + jitter;
    Duration::from_secs_f64(adjusted.max(0.0))
}

/// Determine if an error should trigger a retry
///
/// Pure function that checks error message against retry patterns.
pub fn should_retry_error(error_message: &str, retry_config: &RetryConfig) -> bool {
    if retry_config.retry_on.is_empty() {
        return true; // Retry all errors if no specific matchers
    }

    retry_config
        .retry_on
        .iter()
        .any(|matcher| matcher.matches(error_message))
}

// ============================================================================
// Failure Recovery Types
// ============================================================================

/// Result of executing a failure handler
#[derive(Debug, Clone)]
pub struct FailureHandlerResult {
    pub success: bool,
    #[allow(dead_code)] // Used for handler output tracking
    pub outputs: Vec<String>,
    #[allow(dead_code)] // Reserved for future recovery tracking
    pub recovered: bool,
}

/// Context for retry execution
#[derive(Debug, Clone)]
pub struct RetryContext {
    #[allow(dead_code)] // Used for tracking but not directly read
    pub command_id: String,
    pub attempt: u32,
    pub max_attempts: u32,
    pub last_error: Option<String>,
}

impl RetryContext {
    pub fn new(command_id: String, max_attempts: u32) -> Self {
        Self {
            command_id,
            attempt: 0,
            max_attempts,
            last_error: None,
        }
    }

    pub fn next_attempt(&mut self) {
        self.attempt += 1;
    }

    pub fn record_error(&mut self, error: String) {
        self.last_error = Some(error);
    }

    pub fn should_continue(&self) -> bool {
        self.attempt < self.max_attempts
    }

    pub fn is_first_attempt(&self) -> bool {
        self.attempt == 0
    }
}

// ============================================================================
// Retry Attempt Tracking
// ============================================================================

/// Create a retry attempt record for tracking
pub fn create_retry_attempt(
    attempt_number: u32,
    duration: Duration,
    success: bool,
    error: Option<String>,
    backoff_applied: Duration,
    exit_code: Option<i32>,
) -> RetryAttempt {
    RetryAttempt {
        attempt_number,
        executed_at: chrono::Utc::now(),
        duration,
        success,
        error,
        backoff_applied,
        exit_code,
    }
}

// ============================================================================
// Failure Handler Logic
// ============================================================================

/// Determine recovery strategy from failure handler result
pub fn determine_recovery_strategy(
    handler_result: &FailureHandlerResult,
    strategy: HandlerStrategy,
) -> bool {
    handler_result.success && strategy == HandlerStrategy::Recovery
}

/// Check if handler failure should be fatal
pub fn is_handler_failure_fatal(
    handler_success: bool,
    on_failure_config: &OnFailureConfig,
) -> bool {
    !handler_success && on_failure_config.handler_failure_fatal()
}

/// Build error message for retry exhaustion
pub fn build_retry_exhausted_message(
    step_name: &str,
    attempts: u32,
    last_error: Option<&str>,
) -> String {
    match last_error {
        Some(err) => format!(
            "Failed '{}' after {} attempts: {}",
            step_name, attempts, err
        ),
        None => format!("Failed '{}' after {} attempts", step_name, attempts),
    }
}

// ============================================================================
// Retry Decision Logic
// ============================================================================

/// Determine if a retry should be attempted
///
/// Pure function that encapsulates all retry decision logic.
pub fn should_attempt_retry(
    ctx: &RetryContext,
    error_message: &str,
    retry_config: &RetryConfig,
) -> bool {
    if !ctx.should_continue() {
        return false;
    }

    should_retry_error(error_message, retry_config)
}

/// Format retry progress message
pub fn format_retry_message(
    step_name: &str,
    attempt: u32,
    max_attempts: u32,
    delay: Duration,
) -> String {
    format!(
        "Retrying {} (attempt {}/{}) after {:?}",
        step_name, attempt, max_attempts, delay
    )
}

/// Format retry success message
pub fn format_retry_success_message(step_name: &str, attempts: u32) -> String {
    format!("'{}' succeeded after {} attempts", step_name, attempts)
}

/// Format retry failure message
pub fn format_retry_failure_message(attempt: u32, max_attempts: u32, error: &str) -> String {
    format!(
        "Command failed (attempt {}/{}): {}",
        attempt, max_attempts, error
    )
}

// ============================================================================
// Handler Strategy Helpers
// ============================================================================

/// Check if handlers should retry the original command
pub fn should_retry_after_handler(on_failure_config: &OnFailureConfig, success: bool) -> bool {
    on_failure_config.should_retry() && !success
}

/// Get max retries from on_failure config
pub fn get_handler_max_retries(on_failure_config: &OnFailureConfig) -> u32 {
    on_failure_config.max_retries()
}

/// Get handler timeout
#[allow(dead_code)] // Will be used in future refactoring phases
pub fn get_handler_timeout(on_failure_config: &OnFailureConfig) -> Option<u64> {
    on_failure_config.handler_timeout()
}

// ============================================================================
// Step Result Modification
// ============================================================================

/// Mark step as recovered after successful handler
pub fn mark_step_recovered(mut result: StepResult) -> StepResult {
    result.success = true;
    result.stderr.clear();
    result.exit_code = Some(0);
    result
}

/// Append handler output to step result
pub fn append_handler_output(mut result: StepResult, handler_outputs: &[String]) -> StepResult {
    result.stdout.push_str("\n--- on_failure output ---\n");
    result.stdout.push_str(&handler_outputs.join("\n"));
    result
}

// ============================================================================
// Tests
// ============================================================================
