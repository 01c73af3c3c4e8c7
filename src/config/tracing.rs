// Allow large error types from premortem's API design
#![allow(clippy::result_large_err)]

//! Configuration value tracing for debugging.
//!
//! This module provides types and functions for tracing where configuration
//! values come from and their override history. It wraps premortem's `TracedConfig`
//! with additional utilities for CLI output and issue detection.
//!
//! # Example
//!
//! ```ignore
//! use prodigy::config::tracing::{trace_config, TraceOutput};
//!
//! let traced = trace_config()?;
//!
//! // Query a specific path
//! if let Some(trace) = traced.trace("log_level") {
//!     println!("log_level: {}", trace.explain("log_level"));
//! }
//!
//! // Get all traces
//! for (path, trace) in traced.all_traces() {
//!     println!("{}", trace.explain(&path));
//! }
//!
//! // Get JSON output
//! let json = traced.to_json("log_level")?;
//! ```

use premortem::trace::{TracedConfig, ValueTrace};
use serde::{Deserialize, Serialize};

use super::builder::load_prodigy_config_traced_with;
use super::prodigy_config::ProdigyConfig;
use premortem::prelude::*;

/// Load configuration with tracing enabled.
///
/// Returns a traced configuration that can be queried for value origins.
pub fn trace_config() -> Result<TracedProdigyConfig, ConfigErrors> {
    let traced = load_prodigy_config_traced_with(&RealEnv)?;
    Ok(TracedProdigyConfig::new(traced))
}

/// Load configuration with tracing using a custom environment.
///
/// For testing with MockEnv.
pub fn trace_config_with<E: ConfigEnv>(env: &E) -> Result<TracedProdigyConfig, ConfigErrors> {
    let traced = load_prodigy_config_traced_with(env)?;
    Ok(TracedProdigyConfig::new(traced))
}

/// Wrapper around TracedConfig with additional utilities.
pub struct TracedProdigyConfig {
    inner: TracedConfig<ProdigyConfig>,
}

impl TracedProdigyConfig {
    /// Create a new traced config wrapper.
    pub fn new(inner: TracedConfig<ProdigyConfig>) -> Self {
        Self { inner }
    }

    /// Get the trace for a specific path.
    pub fn trace(&self, path: &str) -> Option<ValueTraceInfo> {
        self.inner.trace(path).map(ValueTraceInfo::from_premortem)
    }

    /// Check if a path was overridden.
    pub fn was_overridden(&self, path: &str) -> bool {
        self.inner.was_overridden(path)
    }

    /// Get all traced paths with their traces.
    pub fn all_traces(&self) -> Vec<(String, ValueTraceInfo)> {
        self.inner
            .traces()
            .map(|(path, trace)| (path.to_string(), ValueTraceInfo::from_premortem(trace)))
            .collect()
    }

    /// Get paths that were overridden by higher-priority sources.
    pub fn overridden_paths(&self) -> Vec<String> {
        self.inner
            .overridden_paths()
            .map(|s| s.to_string())
            .collect()
    }

    /// Get all traced paths.
    pub fn paths(&self) -> Vec<String> {
        self.inner.paths().map(|s| s.to_string()).collect()
    }

    /// Get the underlying configuration.
    pub fn config(&self) -> &ProdigyConfig {
        self.inner.value()
    }

    /// Consume and return the configuration.
    pub fn into_config(self) -> ProdigyConfig {
        self.inner.into_inner()
    }

    /// Generate JSON output for a specific path.
    pub fn to_json(&self, path: &str) -> Option<TraceJsonOutput> {
        self.trace(path).map(|trace| TraceJsonOutput {
            path: path.to_string(),
            final_value: trace.final_value.clone(),
            final_source: trace.final_source.clone(),
            history: trace.history.clone(),
        })
    }

    /// Generate JSON output for all overridden paths.
    pub fn overrides_to_json(&self) -> Vec<TraceJsonOutput> {
        self.overridden_paths()
            .into_iter()
            .filter_map(|path| self.to_json(&path))
            .collect()
    }

    /// Generate JSON output for all paths.
    pub fn all_to_json(&self) -> Vec<TraceJsonOutput> {
        self.paths()
            .into_iter()
            .filter_map(|path| self.to_json(&path))
            .collect()
    }
}

impl std::ops::Deref for TracedProdigyConfig {
    type Target = ProdigyConfig;

    fn deref(&self) -> &Self::Target {
        self.inner.value()
    }
}

/// Information about a traced value's source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueSourceInfo {
    /// Type of source
    #[serde(rename = "type")]
    pub source_type: SourceType,

    /// Source identifier (file path, env var name, etc.)
    pub source: String,

    /// Line number for file sources
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,

    /// Column number for file sources
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

impl ValueSourceInfo {
    /// Create a new source info from premortem's SourceLocation.
    fn from_premortem(source: &premortem::error::SourceLocation) -> Self {
        let source_str = source.source.as_str();

        let source_type = if source_str == "defaults" {
            SourceType::Default
        } else if source_str.starts_with("env:") || source_str.starts_with("$") {
            SourceType::Environment
        } else {
            SourceType::File
        };

        Self {
            source_type,
            source: source_str.to_string(),
            line: source.line,
            column: source.column,
        }
    }

    /// Format the source for display.
    pub fn display(&self) -> String {
        match self.source_type {
            SourceType::Default => "default".to_string(),
            SourceType::Environment => {
                if self.source.starts_with("env:") {
                    format!("${}", &self.source[4..])
                } else {
                    format!("${}", self.source)
                }
            }
            SourceType::File => match self.line {
                Some(line) => format!("{}:{}", self.source, line),
                None => self.source.clone(),
            },
        }
    }
}

/// Type of configuration source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// Hardcoded default value
    Default,
    /// From configuration file
    File,
    /// From environment variable
    Environment,
}

/// Entry in the value history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// The value at this point in history
    pub value: serde_json::Value,

    /// Source of this value
    pub source: ValueSourceInfo,

    /// Whether this value was overridden by a later source
    pub overridden: bool,
}

/// Information about a value's trace.
#[derive(Debug, Clone)]
pub struct ValueTraceInfo {
    /// The final resolved value
    pub final_value: serde_json::Value,

    /// Source of the final value
    pub final_source: ValueSourceInfo,

    /// All values this key had, in order of application
    pub history: Vec<HistoryEntry>,
}

impl ValueTraceInfo {
    /// Create from premortem's ValueTrace.
    fn from_premortem(trace: &ValueTrace) -> Self {
        let history: Vec<HistoryEntry> = trace
            .history
            .iter()
            .map(|tv| HistoryEntry {
                value: premortem_value_to_json(&tv.value),
                source: ValueSourceInfo::from_premortem(&tv.source),
                overridden: !tv.is_final,
            })
            .collect();

        Self {
            final_value: premortem_value_to_json(&trace.final_value.value),
            final_source: ValueSourceInfo::from_premortem(&trace.final_value.source),
            history,
        }
    }

    /// Check if the value was overridden.
    pub fn was_overridden(&self) -> bool {
        self.history.len() > 1
    }

    /// Get the number of sources that provided this value.
    pub fn source_count(&self) -> usize {
        self.history.len()
    }

    /// Generate a human-readable explanation of the trace.
    pub fn explain(&self, path: &str) -> String {
        let mut lines = Vec::new();

        // Format the final value
        let value_str = format_json_value(&self.final_value);
        lines.push(format!("{}: {}", path, value_str));

        // Format the history
        for (i, entry) in self.history.iter().enumerate() {
            let is_last = i == self.history.len() - 1;
            let prefix = if is_last {
                "  └──"
            } else {
                "  ├──"
            };

            let value_str = format_json_value(&entry.value);
            let marker = if entry.overridden {
                " (overridden)"
            } else {
                " ← final value"
            };

            lines.push(format!(
                "{} {}: {}{}",
                prefix,
                entry.source.display(),
                value_str,
                marker
            ));
        }

        lines.join("\n")
    }
}

/// JSON output format for trace information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceJsonOutput {
    /// Configuration path
    pub path: String,

    /// Final resolved value
    pub final_value: serde_json::Value,

    /// Source of final value
    pub final_source: ValueSourceInfo,

    /// Complete history of values
    pub history: Vec<HistoryEntry>,
}

/// Convert premortem Value to serde_json Value.
fn premortem_value_to_json(value: &premortem::value::Value) -> serde_json::Value {
    match value {
        premortem::value::Value::Null => serde_json::Value::Null,
        premortem::value::Value::Bool(b) => serde_json::Value::Bool(*b),
        premortem::value::Value::Integer(i) => serde_json::json!(*i),
        premortem::value::Value::Float(f) => serde_json::json!(*f),
        premortem::value::Value::String(s) => serde_json::Value::String(s.clone()),
        premortem::value::Value::Array(arr) => {
            serde_json::Value::Array(arr.iter().map(premortem_value_to_json).collect())
        }
        premortem::value::Value::Table(table) => {
            let map: serde_json::Map<String, serde_json::Value> = table
                .iter()
                .map(|(k, v)| (k.clone(), premortem_value_to_json(v)))
                .collect();
            serde_json::Value::Object(map)
        }
    }
}

/// Format a JSON value for display.
fn format_json_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => format!("\"{}\"", s),
        serde_json::Value::Null => "null".to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            serde_json::to_string(value).unwrap_or_else(|_| format!("{:?}", value))
        }
    }
}
