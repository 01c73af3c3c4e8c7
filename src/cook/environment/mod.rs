//! Environment management for workflow execution
//!
//! Provides comprehensive environment variable management and working directory control
//! at global, workflow, and step levels. Supports secret management, dynamic values,
//! conditional environments, and cross-platform path handling.

mod config;
mod manager;
mod path_resolver;
mod secret_store;

pub use config::{
    ConditionalEnv, DynamicEnv, EnvProfile, EnvValue, EnvironmentConfig, SecretProvider,
    SecretValue, StepEnvironment,
};
pub use manager::{EnvironmentContext, EnvironmentManager, EnvironmentSnapshot};
pub use path_resolver::{PathResolver, Platform};
pub use secret_store::{SecretStore, SecretStoreError};

use std::collections::HashMap;

/// Environment utilities for workflow execution
pub struct EnvironmentUtils;

impl EnvironmentUtils {
    /// Mask secrets in text output (pure function)
    pub fn mask_secrets(
        text: &str,
        secret_keys: &[String],
        env: &HashMap<String, String>,
    ) -> String {
        let mut masked = text.to_string();
        for key in secret_keys {
            if let Some(value) = env.get(key) {
                // Only mask if value is not empty and not just whitespace
                if !value.trim().is_empty() {
                    masked = masked.replace(value, "***MASKED***");
                }
            }
        }
        masked
    }

    /// Extract secret keys from environment configuration (pure function)
    pub fn extract_secret_keys(config: &EnvironmentConfig) -> Vec<String> {
        config.secrets.keys().cloned().collect()
    }

    /// Merge environment maps with precedence (pure function)
    /// Later values override earlier ones
    pub fn merge_env_maps(maps: Vec<HashMap<String, String>>) -> HashMap<String, String> {
        let mut result = HashMap::new();
        for map in maps {
            result.extend(map);
        }
        result
    }

    /// Check if a path needs expansion (pure function)
    pub fn needs_path_expansion(path: &str) -> bool {
        path.contains('~') || path.contains("${") || path.contains('$')
    }
}
