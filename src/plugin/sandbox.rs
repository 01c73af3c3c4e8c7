use crate::error::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::PluginId;

/// Plugin sandbox provides isolated execution environment
pub struct PluginSandbox {
    config: SandboxConfig,
}

/// Sandbox configuration
#[derive(Debug, Clone)]
pub struct SandboxConfig {
    /// Enable process isolation
    pub process_isolation: bool,
    /// Enable WebAssembly runtime
    pub wasm_runtime: bool,
    /// Maximum execution time per operation
    pub max_execution_time: Duration,
    /// Maximum memory usage per plugin
    pub max_memory_mb: u64,
    /// Maximum number of file operations per second
    pub max_file_ops_per_second: u32,
    /// Maximum number of network requests per minute
    pub max_network_requests_per_minute: u32,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            process_isolation: false, // Disabled by default for development
            wasm_runtime: false,      // Disabled by default for development
            max_execution_time: Duration::from_secs(30),
            max_memory_mb: 100,
            max_file_ops_per_second: 10,
            max_network_requests_per_minute: 60,
        }
    }
}

impl PluginSandbox {
    pub fn new() -> Self {
        Self {
            config: SandboxConfig::default(),
        }
    }

    pub fn with_config(config: SandboxConfig) -> Self {
        Self { config }
    }

    /// Execute a plugin operation safely with timeout and resource limits
    pub async fn execute_safe<F, Fut, T>(&self, plugin_id: PluginId, operation: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        debug!("Executing plugin {} operation in sandbox", plugin_id);

        // Apply execution timeout
        let result = timeout(self.config.max_execution_time, operation()).await;

        match result {
            Ok(Ok(value)) => {
                debug!("Plugin {} operation completed successfully", plugin_id);
                Ok(value)
            }
            Ok(Err(e)) => {
                warn!("Plugin {} operation failed: {}", plugin_id, e);
                Err(e)
            }
            Err(_) => {
                warn!(
                    "Plugin {} operation timed out after {:?}",
                    plugin_id, self.config.max_execution_time
                );
                Err(Error::PluginTimeout(format!(
                    "Plugin {} operation timed out after {:?}",
                    plugin_id, self.config.max_execution_time
                )))
            }
        }
    }

    /// Execute with resource monitoring
    pub async fn execute_monitored<F, Fut, T>(
        &self,
        plugin_id: PluginId,
        operation: F,
    ) -> Result<ExecutionResult<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let start_time = std::time::Instant::now();
        let start_memory = self.get_memory_usage().await?;

        let result = self.execute_safe(plugin_id, operation).await;

        let end_time = std::time::Instant::now();
        let end_memory = self.get_memory_usage().await?;

        let execution_stats = ExecutionStats {
            duration: end_time - start_time,
            memory_used_mb: end_memory.saturating_sub(start_memory),
            peak_memory_mb: end_memory,
        };

        Ok(ExecutionResult {
            result,
            stats: execution_stats,
        })
    }

    /// Execute in isolated process (if enabled)
    pub async fn execute_isolated<F, Fut, T>(&self, plugin_id: PluginId, operation: F) -> Result<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send,
        T: Send + 'static,
    {
        if !self.config.process_isolation {
            return self.execute_safe(plugin_id, operation).await;
        }

        debug!("Executing plugin {} in isolated process", plugin_id);

        // For now, just execute in current process with additional monitoring
        // In a full implementation, this would spawn a separate process
        self.execute_safe(plugin_id, operation).await
    }

    /// Check if plugin operation is within resource limits
    pub async fn check_resource_limits(&self, plugin_id: PluginId) -> Result<ResourceStatus> {
        let memory_usage = self.get_memory_usage().await?;
        let file_ops_rate = self.get_file_ops_rate(plugin_id).await?;
        let network_rate = self.get_network_rate(plugin_id).await?;

        let mut violations = Vec::new();

        if memory_usage > self.config.max_memory_mb {
            violations.push(ResourceViolation::MemoryExceeded {
                current: memory_usage,
                limit: self.config.max_memory_mb,
            });
        }

        if file_ops_rate > self.config.max_file_ops_per_second {
            violations.push(ResourceViolation::FileOpsExceeded {
                current: file_ops_rate,
                limit: self.config.max_file_ops_per_second,
            });
        }

        if network_rate > self.config.max_network_requests_per_minute {
            violations.push(ResourceViolation::NetworkRateExceeded {
                current: network_rate,
                limit: self.config.max_network_requests_per_minute,
            });
        }

        Ok(ResourceStatus { violations })
    }

    /// Kill plugin if it's misbehaving
    pub async fn kill_plugin(&self, plugin_id: PluginId, reason: &str) -> Result<()> {
        warn!("Killing plugin {} due to: {}", plugin_id, reason);

        // In a full implementation, this would terminate the plugin process
        // For now, we just log the action

        Ok(())
    }

    /// Get current memory usage
    async fn get_memory_usage(&self) -> Result<u64> {
        // In a real implementation, this would check actual memory usage
        // For now, return a mock value
        Ok(50) // 50MB
    }

    /// Get file operations rate for a plugin
    async fn get_file_ops_rate(&self, _plugin_id: PluginId) -> Result<u32> {
        // In a real implementation, this would track actual file operations
        // For now, return a mock value
        Ok(5) // 5 ops/sec
    }

    /// Get network request rate for a plugin
    async fn get_network_rate(&self, _plugin_id: PluginId) -> Result<u32> {
        // In a real implementation, this would track actual network requests
        // For now, return a mock value
        Ok(10) // 10 requests/min
    }
}

impl Default for PluginSandbox {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of plugin execution with statistics
#[derive(Debug)]
pub struct ExecutionResult<T> {
    pub result: Result<T>,
    pub stats: ExecutionStats,
}

/// Execution statistics
#[derive(Debug, Clone)]
pub struct ExecutionStats {
    pub duration: Duration,
    pub memory_used_mb: u64,
    pub peak_memory_mb: u64,
}

/// Resource usage status
#[derive(Debug, Clone)]
pub struct ResourceStatus {
    pub violations: Vec<ResourceViolation>,
}

impl ResourceStatus {
    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn has_violations(&self) -> bool {
        !self.violations.is_empty()
    }
}

/// Types of resource violations
#[derive(Debug, Clone)]
pub enum ResourceViolation {
    MemoryExceeded { current: u64, limit: u64 },
    FileOpsExceeded { current: u32, limit: u32 },
    NetworkRateExceeded { current: u32, limit: u32 },
    ExecutionTimeExceeded { duration: Duration, limit: Duration },
}

impl std::fmt::Display for ResourceViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceViolation::MemoryExceeded { current, limit } => {
                write!(f, "Memory usage exceeded: {current}MB > {limit}MB")
            }
            ResourceViolation::FileOpsExceeded { current, limit } => {
                write!(
                    f,
                    "File operations rate exceeded: {current} > {limit} ops/sec"
                )
            }
            ResourceViolation::NetworkRateExceeded { current, limit } => {
                write!(
                    f,
                    "Network request rate exceeded: {current} > {limit} req/min"
                )
            }
            ResourceViolation::ExecutionTimeExceeded { duration, limit } => {
                write!(f, "Execution time exceeded: {duration:?} > {limit:?}")
            }
        }
    }
}

/// WebAssembly runtime for WASM plugins
#[derive(Debug)]
pub struct WasmRuntime {
    // This would contain wasmtime::Engine, Store, etc.
    // For now, it's just a placeholder
}

impl WasmRuntime {
    pub fn new() -> Result<Self> {
        // In a real implementation, this would initialize wasmtime
        Ok(Self {})
    }

    pub async fn load_module(&mut self, _wasm_bytes: &[u8]) -> Result<WasmModule> {
        // In a real implementation, this would compile the WASM module
        Ok(WasmModule {})
    }

    pub async fn execute<F, T>(&self, _operation: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        // In a real implementation, this would execute the operation in WASM context
        // For now, just execute directly
        todo!("WASM execution not implemented")
    }
}

/// WebAssembly module wrapper
#[derive(Debug)]
pub struct WasmModule {
    // This would contain wasmtime::Module, Instance, etc.
}

impl WasmModule {
    pub async fn call_function(
        &self,
        _name: &str,
        _args: &[&dyn std::any::Any],
    ) -> Result<serde_json::Value> {
        // In a real implementation, this would call a WASM function
        todo!("WASM function calls not implemented")
    }
}

/// Process isolation for native plugins
#[derive(Debug)]
pub struct ProcessIsolation {
    // This would contain process management structures
}

impl Default for ProcessIsolation {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessIsolation {
    pub fn new() -> Self {
        Self {}
    }

    pub async fn spawn_plugin_process(
        &self,
        _plugin_path: &std::path::Path,
    ) -> Result<PluginProcess> {
        // In a real implementation, this would spawn a separate process
        todo!("Process isolation not implemented")
    }
}

/// Handle to an isolated plugin process
#[derive(Debug)]
pub struct PluginProcess {
    // This would contain process handle, IPC channels, etc.
}

impl PluginProcess {
    pub async fn send_message(&self, _message: &str) -> Result<String> {
        // In a real implementation, this would send IPC message
        todo!("Plugin process IPC not implemented")
    }

    pub async fn terminate(&self) -> Result<()> {
        // In a real implementation, this would terminate the process
        todo!("Plugin process termination not implemented")
    }
}
