//! Analysis caching implementation

use crate::context::AnalysisResult;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Trait for analysis caching
#[async_trait]
pub trait AnalysisCache: Send + Sync {
    /// Get cached analysis if valid
    async fn get(&self, key: &str) -> Result<Option<AnalysisResult>>;

    /// Store analysis in cache
    async fn put(&self, key: &str, analysis: &AnalysisResult) -> Result<()>;

    /// Check if cache entry is valid
    async fn is_valid(&self, key: &str, max_age: Duration) -> Result<bool>;

    /// Clear all cache entries
    async fn clear(&self) -> Result<()>;

    /// Clear specific cache entry
    async fn remove(&self, key: &str) -> Result<()>;
}

/// File-based analysis cache implementation
pub struct AnalysisCacheImpl {
    cache_dir: PathBuf,
}

impl AnalysisCacheImpl {
    /// Create a new analysis cache
    pub fn new(project_path: &Path) -> Self {
        Self {
            cache_dir: project_path.join(".mmm/cache/analysis"),
        }
    }

    /// Get cache file path for a key
    fn cache_path(&self, key: &str) -> PathBuf {
        // Hash the key to avoid filesystem issues
        let hash = format!("{:x}", md5::compute(key));
        self.cache_dir.join(format!("{hash}.json"))
    }

    /// Ensure cache directory exists
    async fn ensure_cache_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.cache_dir).await?;
        Ok(())
    }
}

#[async_trait]
impl AnalysisCache for AnalysisCacheImpl {
    async fn get(&self, key: &str) -> Result<Option<AnalysisResult>> {
        let cache_path = self.cache_path(key);

        if !cache_path.exists() {
            return Ok(None);
        }

        match fs::read_to_string(&cache_path).await {
            Ok(content) => {
                match serde_json::from_str::<AnalysisResult>(&content) {
                    Ok(analysis) => Ok(Some(analysis)),
                    Err(e) => {
                        // Invalid cache entry, remove it
                        let _ = fs::remove_file(&cache_path).await;
                        eprintln!("Invalid cache entry {key}: {e}");
                        Ok(None)
                    }
                }
            }
            Err(_) => Ok(None),
        }
    }

    async fn put(&self, key: &str, analysis: &AnalysisResult) -> Result<()> {
        self.ensure_cache_dir().await?;

        let cache_path = self.cache_path(key);
        let json = serde_json::to_string_pretty(analysis)?;
        fs::write(&cache_path, json).await?;

        Ok(())
    }

    async fn is_valid(&self, key: &str, max_age: Duration) -> Result<bool> {
        let cache_path = self.cache_path(key);

        if !cache_path.exists() {
            return Ok(false);
        }

        // Check file modification time
        let metadata = fs::metadata(&cache_path).await?;
        if let Ok(modified) = metadata.modified() {
            if let Ok(modified_time) = modified.duration_since(std::time::UNIX_EPOCH) {
                let modified_datetime =
                    DateTime::<Utc>::from(std::time::UNIX_EPOCH + modified_time);
                let age = Utc::now().signed_duration_since(modified_datetime);
                return Ok(age < max_age);
            }
        }

        // If we can't determine age, consider it invalid
        Ok(false)
    }

    async fn clear(&self) -> Result<()> {
        if self.cache_dir.exists() {
            fs::remove_dir_all(&self.cache_dir).await?;
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let cache_path = self.cache_path(key);
        if cache_path.exists() {
            fs::remove_file(&cache_path).await?;
        }
        Ok(())
    }
}
