//! Cross-platform path resolution
//!
//! Handles path resolution, variable expansion, and separator normalization
//! across different operating systems.

use regex::Regex;
use std::path::PathBuf;

/// Platform type for path resolution
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Platform {
    Windows,
    Unix,
}

impl Platform {
    /// Detect current platform
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }
}

/// Path resolver for cross-platform path handling
pub struct PathResolver {
    platform: Platform,
}

impl PathResolver {
    /// Create a new path resolver for the current platform
    pub fn new() -> Self {
        Self {
            platform: Platform::current(),
        }
    }

    /// Create a path resolver for a specific platform
    pub fn with_platform(platform: Platform) -> Self {
        Self { platform }
    }

    /// Resolve a path with variable expansion and normalization
    pub fn resolve(&self, path: &str) -> PathBuf {
        let expanded = self.expand_variables(path);
        let normalized = self.normalize_separators(&expanded);
        PathBuf::from(normalized)
    }

    /// Expand variables in path (pure function)
    fn expand_variables(&self, path: &str) -> String {
        let mut result = path.to_string();

        // Expand ~ to home directory
        result = self.expand_home_dir(result);

        // Expand environment variables
        result = self.expand_env_vars(result);

        result
    }

    /// Expand home directory notation (pure function)
    fn expand_home_dir(&self, path: String) -> String {
        if path.starts_with("~/") || path == "~" {
            if let Ok(home) = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")) {
                if path == "~" {
                    return home;
                }
                return path.replacen("~", &home, 1);
            }
        }
        path
    }

    /// Expand environment variables in path (pure function)
    fn expand_env_vars(&self, path: String) -> String {
        // Match ${VAR} or $VAR patterns
        let env_var_re = Regex::new(r"\$\{([^}]+)\}|\$([A-Za-z_][A-Za-z0-9_]*)").unwrap();

        let mut result = path.clone();
        for cap in env_var_re.captures_iter(&path) {
            let var_name = cap.get(1).or_else(|| cap.get(2)).unwrap().as_str();
            if let Ok(value) = std::env::var(var_name) {
                result = result.replace(cap.get(0).unwrap().as_str(), &value);
            }
        }
        result
    }

    /// Normalize path separators for platform (pure function)
    fn normalize_separators(&self, path: &str) -> String {
        match self.platform {
            Platform::Windows => {
                // Convert forward slashes to backslashes on Windows
                // But preserve UNC paths and single forward slashes in arguments
                if path.starts_with("\\\\") || path.starts_with("//") {
                    // UNC path - normalize to backslashes
                    path.replace('/', "\\")
                } else {
                    path.replace('/', "\\")
                }
            }
            Platform::Unix => {
                // Convert backslashes to forward slashes on Unix
                path.replace('\\', "/")
            }
        }
    }

    /// Check if a path is absolute
    pub fn is_absolute(&self, path: &str) -> bool {
        match self.platform {
            Platform::Windows => {
                // Windows absolute paths:
                // - Start with drive letter (C:\)
                // - Start with UNC (\\server\share)
                path.chars().nth(1) == Some(':')
                    || path.starts_with("\\\\")
                    || path.starts_with("//")
            }
            Platform::Unix => {
                // Unix absolute paths start with /
                path.starts_with('/')
            }
        }
    }

    /// Join two paths
    pub fn join(&self, base: &str, path: &str) -> String {
        if self.is_absolute(path) {
            return path.to_string();
        }

        let separator = match self.platform {
            Platform::Windows => "\\",
            Platform::Unix => "/",
        };

        let base = base.trim_end_matches(&['/', '\\'][..]);
        format!("{}{}{}", base, separator, path)
    }
}

impl Default for PathResolver {
    fn default() -> Self {
        Self::new()
    }
}
