//! Effect-based session update operations
//!
//! This module provides Stillwater Effect abstractions for session I/O operations,
//! following the "pure core, imperative shell" pattern. Session updates are
//! encapsulated in Effects that compose pure transformations with I/O operations.
//!
//! # Architecture
//!
//! - **Pure logic** lives in `core::session::updates` (apply_session_update, apply_updates)
//! - **I/O effects** live here (load, save session operations)
//! - **Environment** provides storage via dependency injection
//!
//! # Example
//!
//! ```ignore
//! use prodigy::unified_session::effects::{update_session_effect, SessionEnv};
//! use prodigy::core::session::updates::SessionUpdate;
//!
//! let env = SessionEnv::new(storage);
//! let update = SessionUpdate::Status(SessionStatus::Running);
//!
//! let effect = update_session_effect(session_id, update);
//! let updated_session = effect.run(&env).await?;
//! ```

use crate::core::session::updates::{apply_session_update, apply_updates, SessionUpdate};
use crate::unified_session::{SessionId, UnifiedSession};
use async_trait::async_trait;
use std::sync::Arc;
use stillwater::Effect;

/// Error type for session effects
#[derive(Debug, Clone)]
pub enum SessionEffectError {
    /// Session not found
    NotFound { id: String },
    /// Failed to load session
    LoadFailed { message: String },
    /// Failed to save session
    SaveFailed { message: String },
    /// Invalid session update
    InvalidUpdate { message: String },
}

impl std::fmt::Display for SessionEffectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionEffectError::NotFound { id } => {
                write!(f, "Session not found: {}", id)
            }
            SessionEffectError::LoadFailed { message } => {
                write!(f, "Failed to load session: {}", message)
            }
            SessionEffectError::SaveFailed { message } => {
                write!(f, "Failed to save session: {}", message)
            }
            SessionEffectError::InvalidUpdate { message } => {
                write!(f, "Invalid session update: {}", message)
            }
        }
    }
}

impl std::error::Error for SessionEffectError {}

/// Trait for async session storage operations
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Load a session by ID
    async fn load_session(&self, id: &SessionId) -> anyhow::Result<UnifiedSession>;

    /// Save a session
    async fn save_session(&self, session: &UnifiedSession) -> anyhow::Result<()>;
}

/// Environment for session effect execution
///
/// Provides dependencies for session I/O operations.
#[derive(Clone)]
pub struct SessionEnv {
    /// Storage implementation for session persistence
    pub storage: Arc<dyn SessionStorage>,
}

impl SessionEnv {
    /// Create a new session environment
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self { storage }
    }
}

/// Effect: Update session with I/O
///
/// This effect composes I/O (load, save) with pure transformations
/// (apply_session_update) using the Effect pattern.
///
/// # Arguments
///
/// * `id` - Session ID to update
/// * `update` - The update to apply
///
/// # Returns
///
/// An Effect that, when run, will:
/// 1. I/O: Load the session from storage
/// 2. Pure: Apply the update transformation
/// 3. I/O: Save the updated session
/// 4. Return the updated session
///
/// # Example
///
/// ```ignore
/// let update = SessionUpdate::Status(SessionStatus::Running);
/// let effect = update_session_effect(session_id, update);
/// let session = effect.run(&env).await?;
/// ```
pub fn update_session_effect(
    id: SessionId,
    update: SessionUpdate,
) -> Effect<UnifiedSession, SessionEffectError, SessionEnv> {
    Effect::from_async(move |env: &SessionEnv| {
        let id = id.clone();
        let update = update.clone();
        let storage = env.storage.clone();

        async move {
            // I/O: Load session
            let session =
                storage
                    .load_session(&id)
                    .await
                    .map_err(|e| SessionEffectError::LoadFailed {
                        message: e.to_string(),
                    })?;

            // Pure: Apply update
            let updated = apply_session_update(session, update).map_err(|e| {
                SessionEffectError::InvalidUpdate {
                    message: e.to_string(),
                }
            })?;

            // I/O: Save session
            storage
                .save_session(&updated)
                .await
                .map_err(|e| SessionEffectError::SaveFailed {
                    message: e.to_string(),
                })?;

            Ok(updated)
        }
    })
}

/// Effect: Batch update session (multiple updates atomically)
///
/// Applies multiple updates to a session in sequence, loading once
/// and saving once for efficiency.
///
/// # Arguments
///
/// * `id` - Session ID to update
/// * `updates` - Vector of updates to apply in order
///
/// # Returns
///
/// An Effect that applies all updates and returns the final session state.
///
/// # Example
///
/// ```ignore
/// let updates = vec![
///     SessionUpdate::Status(SessionStatus::Running),
///     SessionUpdate::Progress(ProgressUpdate { completed_steps: 5, .. }),
/// ];
///
/// let effect = batch_update_session_effect(session_id, updates);
/// let session = effect.run(&env).await?;
/// ```
pub fn batch_update_session_effect(
    id: SessionId,
    updates: Vec<SessionUpdate>,
) -> Effect<UnifiedSession, SessionEffectError, SessionEnv> {
    Effect::from_async(move |env: &SessionEnv| {
        let id = id.clone();
        let updates = updates.clone();
        let storage = env.storage.clone();

        async move {
            // I/O: Load once
            let session =
                storage
                    .load_session(&id)
                    .await
                    .map_err(|e| SessionEffectError::LoadFailed {
                        message: e.to_string(),
                    })?;

            // Pure: Apply all updates
            let updated =
                apply_updates(session, updates).map_err(|e| SessionEffectError::InvalidUpdate {
                    message: e.to_string(),
                })?;

            // I/O: Save once
            storage
                .save_session(&updated)
                .await
                .map_err(|e| SessionEffectError::SaveFailed {
                    message: e.to_string(),
                })?;

            Ok(updated)
        }
    })
}

/// Effect: Load session without modification
///
/// Pure I/O effect that loads a session from storage.
pub fn load_session_effect(
    id: SessionId,
) -> Effect<UnifiedSession, SessionEffectError, SessionEnv> {
    Effect::from_async(move |env: &SessionEnv| {
        let id = id.clone();
        let storage = env.storage.clone();

        async move {
            storage
                .load_session(&id)
                .await
                .map_err(|e| SessionEffectError::LoadFailed {
                    message: e.to_string(),
                })
        }
    })
}

/// Effect: Save session to storage
///
/// Pure I/O effect that saves a session to storage.
pub fn save_session_effect(session: UnifiedSession) -> Effect<(), SessionEffectError, SessionEnv> {
    Effect::from_async(move |env: &SessionEnv| {
        let session = session.clone();
        let storage = env.storage.clone();

        async move {
            storage
                .save_session(&session)
                .await
                .map_err(|e| SessionEffectError::SaveFailed {
                    message: e.to_string(),
                })
        }
    })
}
