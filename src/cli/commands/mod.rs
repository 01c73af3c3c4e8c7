//! Command implementation modules
//!
//! This module contains the implementation of each CLI command.
//! Each command is implemented as a separate module for better organization.

pub mod checkpoints;
pub mod dlq;
pub mod events;
pub mod exec;
pub mod goal_seek;
pub mod logs;
pub mod progress;
pub mod resume;
pub mod sessions;
pub mod worktree;

// Re-export command execution functions
pub use checkpoints::run_checkpoints_command;
pub use dlq::run_dlq_command;
pub use events::run_events_command;
pub use exec::{run_batch_command, run_exec_command};
pub use goal_seek::{run_goal_seek, GoalSeekParams};
pub use logs::run_logs_command;
pub use progress::run_progress_command;
pub use resume::{run_resume_job_command, run_resume_workflow};
pub use sessions::run_sessions_command;
pub use worktree::run_worktree_command;
