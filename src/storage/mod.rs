//! Global storage management for events, DLQ, and job state
//!
//! This module provides centralized storage under ~/.prodigy/ to enable
//! cross-worktree data sharing and persistent job state management.

use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Global storage paths configuration
pub struct GlobalStorage {
    /// Base directory for all global storage (~/.prodigy)
    base_dir: PathBuf,
    /// Repository name extracted from project path
    repo_name: String,
}

impl GlobalStorage {
    /// Create a new global storage instance for a repository
    pub fn new(repo_path: &Path) -> Result<Self> {
        let repo_name = extract_repo_name(repo_path)?;
        let base_dir = get_global_base_dir()?;

        Ok(Self {
            base_dir,
            repo_name,
        })
    }

    /// Get the global events directory for this repository
    pub async fn get_events_dir(&self, job_id: &str) -> Result<PathBuf> {
        let path = self
            .base_dir
            .join("events")
            .join(&self.repo_name)
            .join(job_id);

        fs::create_dir_all(&path)
            .await
            .context("Failed to create global events directory")?;

        Ok(path)
    }

    /// Get the global DLQ directory for this repository
    pub async fn get_dlq_dir(&self, job_id: &str) -> Result<PathBuf> {
        let path = self.base_dir.join("dlq").join(&self.repo_name).join(job_id);

        fs::create_dir_all(&path)
            .await
            .context("Failed to create global DLQ directory")?;

        Ok(path)
    }

    /// Get the global state directory for this repository
    pub async fn get_state_dir(&self, job_id: &str) -> Result<PathBuf> {
        let path = self
            .base_dir
            .join("state")
            .join(&self.repo_name)
            .join(job_id);

        fs::create_dir_all(&path)
            .await
            .context("Failed to create global state directory")?;

        Ok(path)
    }

    /// Get repository name for this storage instance
    pub fn repo_name(&self) -> &str {
        &self.repo_name
    }

    /// List all job IDs with DLQ data for this repository
    pub async fn list_dlq_job_ids(&self) -> Result<Vec<String>> {
        let dlq_repo_dir = self.base_dir.join("dlq").join(&self.repo_name);

        if !dlq_repo_dir.exists() {
            return Ok(vec![]);
        }

        let mut job_ids = Vec::new();
        let mut entries = fs::read_dir(dlq_repo_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                if let Some(job_id) = entry.file_name().to_str() {
                    // Check if this job has any DLQ items
                    let items_dir = entry.path().join("items");
                    if items_dir.exists() {
                        let mut items_entries = fs::read_dir(&items_dir).await?;
                        if items_entries.next_entry().await?.is_some() {
                            job_ids.push(job_id.to_string());
                        }
                    }
                }
            }
        }

        // Sort by name (which includes timestamps)
        job_ids.sort();
        job_ids.reverse(); // Most recent first
        Ok(job_ids)
    }

    /// Check if we should use global storage based on environment
    pub fn should_use_global() -> bool {
        // Check for opt-out environment variable
        if std::env::var("PRODIGY_USE_LOCAL_STORAGE").unwrap_or_default() == "true" {
            return false;
        }

        // Default to global storage
        true
    }
}

/// Extract repository name from a project path
/// This matches the logic used by WorktreeManager
pub fn extract_repo_name(repo_path: &Path) -> Result<String> {
    // Canonicalize the path to handle symlinks
    let canonical_path = repo_path
        .canonicalize()
        .unwrap_or_else(|_| repo_path.to_path_buf());

    // Extract the last component as the repository name
    canonical_path
        .file_name()
        .and_then(|n| n.to_str())
        .map(|s| s.to_string())
        .ok_or_else(|| {
            anyhow!(
                "Could not determine repository name from path: {}",
                repo_path.display()
            )
        })
}

/// Get the global base directory (~/.prodigy)
pub fn get_global_base_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .ok_or_else(|| anyhow!("Could not determine home directory"))
        .map(|home| home.join(".prodigy"))
}

/// List DLQ job IDs from local storage (fallback for legacy support)
pub async fn list_local_dlq_job_ids(project_root: &Path) -> Result<Vec<String>> {
    let local_dlq_dir = project_root.join(".prodigy").join("dlq");

    if !local_dlq_dir.exists() {
        return Ok(vec![]);
    }

    let mut job_ids = Vec::new();
    let mut entries = fs::read_dir(local_dlq_dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        if let Some(name) = entry.file_name().to_str() {
            if name.ends_with(".json") {
                job_ids.push(name.trim_end_matches(".json").to_string());
            }
        }
    }

    job_ids.sort();
    job_ids.reverse(); // Most recent first
    Ok(job_ids)
}

/// Discover all available DLQ job IDs, checking both global and local storage
pub async fn discover_dlq_job_ids(project_root: &Path) -> Result<Vec<String>> {
    if GlobalStorage::should_use_global() {
        let storage = GlobalStorage::new(project_root)?;
        storage.list_dlq_job_ids().await
    } else {
        list_local_dlq_job_ids(project_root).await
    }
}

/// Create a new event logger with global storage
pub async fn create_global_event_logger(
    repo_path: &Path,
    job_id: &str,
) -> Result<crate::cook::execution::events::EventLogger> {
    use crate::cook::execution::events::{EventLogger, EventWriter, JsonlEventWriter};

    let storage = GlobalStorage::new(repo_path)?;
    let events_dir = storage.get_events_dir(job_id).await?;

    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let event_file = events_dir.join(format!("events-{}.jsonl", timestamp));

    let writer: Box<dyn EventWriter> = Box::new(
        JsonlEventWriter::new(event_file)
            .await
            .context("Failed to create global event writer")?,
    );

    Ok(EventLogger::new(vec![writer]))
}

/// Create a new DLQ with global storage
pub async fn create_global_dlq(
    repo_path: &Path,
    job_id: &str,
    event_logger: Option<std::sync::Arc<crate::cook::execution::events::EventLogger>>,
) -> Result<crate::cook::execution::dlq::DeadLetterQueue> {
    use crate::cook::execution::dlq::DeadLetterQueue;

    let storage = GlobalStorage::new(repo_path)?;
    let dlq_dir = storage.get_dlq_dir(job_id).await?;

    DeadLetterQueue::new(
        job_id.to_string(),
        dlq_dir,
        1000, // max_items
        30,   // retention_days
        event_logger,
    )
    .await
}

/// Migration utilities for transitioning from local to global storage
pub mod migration {
    use super::*;
    use tokio::fs;
    use tracing::{info, warn};

    /// Check if a project has local storage that needs migration
    pub async fn has_local_storage(project_path: &Path) -> bool {
        let local_dir = project_path.join(".prodigy");
        local_dir.exists() && local_dir.is_dir()
    }

    /// Migrate local storage to global storage
    pub async fn migrate_to_global(project_path: &Path) -> Result<()> {
        let local_dir = project_path.join(".prodigy");

        if !local_dir.exists() {
            return Ok(());
        }

        let storage = GlobalStorage::new(project_path)?;
        info!(
            "Migrating local storage to global for repository: {}",
            storage.repo_name()
        );

        // Migrate events
        let local_events = local_dir.join("events");
        if local_events.exists() {
            migrate_directory(
                &local_events,
                &storage.base_dir.join("events").join(&storage.repo_name),
            )
            .await?;
        }

        // Migrate DLQ
        let local_dlq = local_dir.join("dlq");
        if local_dlq.exists() {
            migrate_directory(
                &local_dlq,
                &storage.base_dir.join("dlq").join(&storage.repo_name),
            )
            .await?;
        }

        // Migrate state
        let local_state = local_dir.join("state");
        if local_state.exists() {
            migrate_directory(
                &local_state,
                &storage.base_dir.join("state").join(&storage.repo_name),
            )
            .await?;
        }

        info!("Migration completed successfully");

        // Optionally remove local directory
        if std::env::var("PRODIGY_REMOVE_LOCAL_AFTER_MIGRATION").unwrap_or_default() == "true" {
            fs::remove_dir_all(&local_dir)
                .await
                .context("Failed to remove local storage after migration")?;
            info!("Removed local storage directory");
        } else {
            warn!(
                "Local storage directory preserved at: {}",
                local_dir.display()
            );
        }

        Ok(())
    }

    async fn migrate_directory(from: &Path, to: &Path) -> Result<()> {
        use tokio::fs;

        if !from.exists() {
            return Ok(());
        }

        // Create target directory
        fs::create_dir_all(to)
            .await
            .context("Failed to create target directory")?;

        // Copy contents recursively
        copy_dir_recursive(from, to).await?;

        info!("Migrated {} to {}", from.display(), to.display());
        Ok(())
    }

    async fn copy_dir_recursive(from: &Path, to: &Path) -> Result<()> {
        let mut entries = fs::read_dir(from)
            .await
            .context("Failed to read source directory")?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let file_name = entry.file_name();
            let target_path = to.join(&file_name);

            if path.is_dir() {
                fs::create_dir_all(&target_path).await?;
                Box::pin(copy_dir_recursive(&path, &target_path)).await?;
            } else {
                fs::copy(&path, &target_path).await?;
            }
        }

        Ok(())
    }
}
