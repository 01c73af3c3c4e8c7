//! Metrics collector backend implementations

use super::events::{
    AggregateResult, Aggregation, MetricEvent, MetricsCollector, MetricsQuery, MetricsReader,
    MetricsResult, Tags,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, RwLock};

/// Configuration for collector backends
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CollectorConfig {
    File {
        path: PathBuf,
        rotate_size: Option<u64>,
        compress: Option<bool>,
    },
    Memory {
        max_events: Option<usize>,
    },
    Remote {
        endpoint: String,
        api_key: String,
        timeout: Option<Duration>,
    },
    Custom {
        name: String,
        config: serde_json::Value,
    },
}

/// File-based metrics collector
pub struct FileMetricsCollector {
    name: String,
    path: PathBuf,
    buffer: Arc<Mutex<Vec<MetricEvent>>>,
    flush_interval: Duration,
    rotate_size: Option<u64>,
    compress: bool,
}

impl FileMetricsCollector {
    /// Create a new file-based collector
    pub fn new(name: impl Into<String>, path: PathBuf) -> Self {
        Self {
            name: name.into(),
            path,
            buffer: Arc::new(Mutex::new(Vec::new())),
            flush_interval: Duration::from_secs(30),
            rotate_size: None,
            compress: false,
        }
    }

    /// Create with configuration
    pub fn with_config(name: impl Into<String>, config: &CollectorConfig) -> Result<Self> {
        match config {
            CollectorConfig::File {
                path,
                rotate_size,
                compress,
            } => Ok(Self {
                name: name.into(),
                path: path.clone(),
                buffer: Arc::new(Mutex::new(Vec::new())),
                flush_interval: Duration::from_secs(30),
                rotate_size: *rotate_size,
                compress: compress.unwrap_or(false),
            }),
            _ => Err(anyhow::anyhow!(
                "Invalid config type for FileMetricsCollector"
            )),
        }
    }

    /// Write events to file
    async fn write_events(&self, events: &[MetricEvent]) -> Result<()> {
        if events.is_empty() {
            return Ok(());
        }

        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create metrics directory")?;
        }

        // Check if we need to rotate the file
        if let Some(max_size) = self.rotate_size {
            if let Ok(metadata) = fs::metadata(&self.path).await {
                if metadata.len() > max_size {
                    self.rotate_file().await?;
                }
            }
        }

        // Append events to file
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .context("Failed to open metrics file")?;

        for event in events {
            let line = serde_json::to_string(event).context("Failed to serialize metric event")?;
            file.write_all(format!("{}\n", line).as_bytes())
                .await
                .context("Failed to write metric event")?;
        }

        file.flush().await.context("Failed to flush metrics file")?;

        Ok(())
    }

    /// Rotate the log file
    async fn rotate_file(&self) -> Result<()> {
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        let mut rotated_path = self.path.clone();
        rotated_path.set_extension(format!("{}.log", timestamp));

        fs::rename(&self.path, &rotated_path)
            .await
            .context("Failed to rotate metrics file")?;

        if self.compress {
            // TODO: Implement compression
            eprintln!("Compression not yet implemented for metrics files");
        }

        Ok(())
    }
}

#[async_trait]
impl MetricsCollector for FileMetricsCollector {
    async fn record(&self, event: MetricEvent) -> Result<()> {
        let mut buffer = self.buffer.lock().await;
        buffer.push(event);

        // Auto-flush if buffer is getting large
        if buffer.len() >= 100 {
            let events = buffer.drain(..).collect::<Vec<_>>();
            drop(buffer); // Release lock before async operation
            self.write_events(&events).await?;
        }

        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        let mut buffer = self.buffer.lock().await;
        if buffer.is_empty() {
            return Ok(());
        }

        let events = buffer.drain(..).collect::<Vec<_>>();
        drop(buffer); // Release lock before async operation

        self.write_events(&events).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// In-memory metrics collector for testing and development
pub struct MemoryMetricsCollector {
    name: String,
    events: Arc<RwLock<Vec<MetricEvent>>>,
    max_events: Option<usize>,
}

impl MemoryMetricsCollector {
    /// Create a new memory collector
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            events: Arc::new(RwLock::new(Vec::new())),
            max_events: Some(10000), // Default limit
        }
    }

    /// Create with configuration
    pub fn with_config(name: impl Into<String>, config: &CollectorConfig) -> Result<Self> {
        match config {
            CollectorConfig::Memory { max_events } => Ok(Self {
                name: name.into(),
                events: Arc::new(RwLock::new(Vec::new())),
                max_events: *max_events,
            }),
            _ => Err(anyhow::anyhow!(
                "Invalid config type for MemoryMetricsCollector"
            )),
        }
    }

    /// Get all stored events (for testing)
    pub async fn get_events(&self) -> Vec<MetricEvent> {
        self.events.read().await.clone()
    }

    /// Clear all stored events
    pub async fn clear(&self) {
        self.events.write().await.clear();
    }

    /// Get event count
    pub async fn event_count(&self) -> usize {
        self.events.read().await.len()
    }
}

#[async_trait]
impl MetricsCollector for MemoryMetricsCollector {
    async fn record(&self, event: MetricEvent) -> Result<()> {
        let mut events = self.events.write().await;

        // Enforce max events limit
        if let Some(max) = self.max_events {
            if events.len() >= max {
                // Remove oldest events (FIFO)
                let remove_count = events.len() - max + 1;
                events.drain(0..remove_count);
            }
        }

        events.push(event);
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        // Memory collector doesn't need to flush
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl MetricsReader for MemoryMetricsCollector {
    async fn query(&self, query: MetricsQuery) -> Result<MetricsResult> {
        let events = self.events.read().await;
        let mut filtered_events = Vec::new();

        for event in events.iter() {
            // Filter by metric names
            if !query.metric_names.is_empty()
                && !query.metric_names.contains(&event.name().to_string())
            {
                continue;
            }

            // Filter by time range
            if let Some(time_range) = &query.time_range {
                let timestamp = event.timestamp();
                if timestamp < time_range.start || timestamp > time_range.end {
                    continue;
                }
            }

            // Filter by tags
            if let Some(query_tags) = &query.tags {
                let event_tags = event.tags();
                let mut matches = true;
                for (key, value) in query_tags {
                    if event_tags.get(key) != Some(value) {
                        matches = false;
                        break;
                    }
                }
                if !matches {
                    continue;
                }
            }

            filtered_events.push(event.clone());
        }

        Ok(MetricsResult {
            count: filtered_events.len(),
            events: filtered_events,
        })
    }

    async fn aggregate(
        &self,
        query: MetricsQuery,
        aggregation: Aggregation,
    ) -> Result<AggregateResult> {
        let result = self.query(query).await?;

        if result.events.is_empty() {
            return Ok(AggregateResult {
                value: 0.0,
                count: 0,
                aggregation,
            });
        }

        let values: Vec<f64> = result
            .events
            .iter()
            .map(|event| {
                match event {
                    MetricEvent::Counter { value, .. } => *value as f64,
                    MetricEvent::Gauge { value, .. } => *value,
                    MetricEvent::Timer { duration, .. } => duration.as_secs_f64(),
                    MetricEvent::Custom { .. } => 1.0, // Count custom events as 1
                }
            })
            .collect();

        let count = values.len();

        let aggregated_value = match aggregation {
            Aggregation::Sum => values.iter().sum(),
            Aggregation::Average => values.iter().sum::<f64>() / values.len() as f64,
            Aggregation::Min => values.iter().fold(f64::INFINITY, |a, &b| a.min(b)),
            Aggregation::Max => values.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b)),
            Aggregation::Count => values.len() as f64,
            Aggregation::Percentile(p) => {
                let mut sorted_values = values;
                sorted_values.sort_by(|a, b| a.partial_cmp(b).unwrap());
                let idx = ((sorted_values.len() - 1) as f64 * p / 100.0).round() as usize;
                sorted_values[idx.min(sorted_values.len() - 1)]
            }
        };

        Ok(AggregateResult {
            value: aggregated_value,
            count,
            aggregation,
        })
    }
}

/// Composite collector that forwards to multiple collectors
pub struct CompositeMetricsCollector {
    name: String,
    collectors: Vec<Arc<dyn MetricsCollector>>,
}

impl CompositeMetricsCollector {
    /// Create a new composite collector
    pub fn new(name: impl Into<String>, collectors: Vec<Arc<dyn MetricsCollector>>) -> Self {
        Self {
            name: name.into(),
            collectors,
        }
    }
}

#[async_trait]
impl MetricsCollector for CompositeMetricsCollector {
    async fn record(&self, event: MetricEvent) -> Result<()> {
        let mut errors = Vec::new();

        for collector in &self.collectors {
            if let Err(e) = collector.record(event.clone()).await {
                errors.push(format!("{}: {}", collector.name(), e));
            }
        }

        if !errors.is_empty() {
            eprintln!("Composite collector errors: {}", errors.join(", "));
        }

        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        let mut errors = Vec::new();

        for collector in &self.collectors {
            if let Err(e) = collector.flush().await {
                errors.push(format!("{}: {}", collector.name(), e));
            }
        }

        if !errors.is_empty() {
            return Err(anyhow::anyhow!("Flush errors: {}", errors.join(", ")));
        }

        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
