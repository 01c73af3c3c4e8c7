//! Session-Job mapping for bidirectional lookup between session IDs and MapReduce job IDs
//!
//! This module provides a mapping between workflow session IDs and MapReduce job IDs,
//! enabling resume operations to work with either ID type.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

/// Bidirectional mapping between session IDs and MapReduce job IDs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionJobMapping {
    /// The session ID (e.g., "session-1234567890")
    pub session_id: String,

    /// The MapReduce job ID (e.g., "mapreduce-1234567890")
    pub job_id: String,

    /// The name of the workflow being executed
    pub workflow_name: String,

    /// When this mapping was created
    pub created_at: DateTime<Utc>,
}

impl SessionJobMapping {
    /// Create a new session-job mapping
    pub fn new(session_id: String, job_id: String, workflow_name: String) -> Self {
        Self {
            session_id,
            job_id,
            workflow_name,
            created_at: Utc::now(),
        }
    }

    /// Store this mapping to disk
    pub async fn store(&self, storage_dir: &Path) -> Result<()> {
        let mapping_dir = storage_dir.join("mappings");
        fs::create_dir_all(&mapping_dir).await?;

        // Store by both session ID and job ID for bidirectional lookup
        let session_file = mapping_dir.join(format!("{}.json", self.session_id));
        let job_file = mapping_dir.join(format!("{}.json", self.job_id));

        let json = serde_json::to_vec_pretty(self)?;

        fs::write(&session_file, &json).await?;
        fs::write(&job_file, &json).await?;

        Ok(())
    }

    /// Load a mapping by session ID
    pub async fn load_by_session(session_id: &str, storage_dir: &Path) -> Result<Option<Self>> {
        let mapping_file = storage_dir
            .join("mappings")
            .join(format!("{}.json", session_id));

        if !mapping_file.exists() {
            return Ok(None);
        }

        let data = fs::read(&mapping_file).await?;
        let mapping: Self =
            serde_json::from_slice(&data).context("Failed to deserialize session-job mapping")?;

        Ok(Some(mapping))
    }

    /// Load a mapping by job ID
    pub async fn load_by_job(job_id: &str, storage_dir: &Path) -> Result<Option<Self>> {
        let mapping_file = storage_dir
            .join("mappings")
            .join(format!("{}.json", job_id));

        if !mapping_file.exists() {
            return Ok(None);
        }

        let data = fs::read(&mapping_file).await?;
        let mapping: Self =
            serde_json::from_slice(&data).context("Failed to deserialize session-job mapping")?;

        Ok(Some(mapping))
    }

    /// Check if a mapping exists for a session ID
    pub async fn exists_for_session(session_id: &str, storage_dir: &Path) -> bool {
        storage_dir
            .join("mappings")
            .join(format!("{}.json", session_id))
            .exists()
    }

    /// Check if a mapping exists for a job ID
    pub async fn exists_for_job(job_id: &str, storage_dir: &Path) -> bool {
        storage_dir
            .join("mappings")
            .join(format!("{}.json", job_id))
            .exists()
    }
}
