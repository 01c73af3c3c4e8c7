use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::SystemTime;
use tokio::fs;

/// Command discovery system for dynamically loading commands from filesystem
///
/// This struct handles scanning the .claude/commands directory for markdown files,
/// caching their contents, and providing them to the command registry for parsing
/// and validation.
pub struct CommandDiscovery {
    commands_dir: PathBuf,
    cache: HashMap<String, CommandFile>,
    last_scan: Option<SystemTime>,
}

impl CommandDiscovery {
    pub fn new(commands_dir: PathBuf) -> Self {
        Self {
            commands_dir,
            cache: HashMap::new(),
            last_scan: None,
        }
    }

    /// Check if a file is a valid command file
    fn is_command_file(path: &std::path::Path) -> bool {
        match path.extension() {
            Some(ext) if ext == "md" => path
                .file_stem()
                .and_then(|name| name.to_str())
                .map(|name| name.starts_with("prodigy-"))
                .unwrap_or(false),
            _ => false,
        }
    }

    /// Get or load command file from cache
    async fn get_or_load_command(
        &mut self,
        path: PathBuf,
        file_name: &str,
        modified: SystemTime,
    ) -> Result<CommandFile> {
        // Check if cached version is still valid
        if let Some(cached) = self.cache.get(file_name) {
            if cached.modified >= modified {
                return Ok(cached.clone());
            }
        }

        // Load and cache the file
        let content = fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read command file: {}", path.display()))?;

        let command_file = CommandFile {
            path: path.clone(),
            name: file_name.to_string(),
            content,
            modified,
        };

        self.cache
            .insert(file_name.to_string(), command_file.clone());

        Ok(command_file)
    }

    /// Scan the commands directory for .md files and return `CommandFile` objects
    ///
    /// This method:
    /// - Reads all .md files from the commands directory
    /// - Filters for files starting with "prodigy-"
    /// - Caches file contents based on modification time
    /// - Returns a list of discovered command files
    pub async fn scan_commands(&mut self) -> Result<Vec<CommandFile>> {
        if !self.commands_dir.exists() {
            return Ok(vec![]);
        }

        let mut commands = Vec::new();
        let mut entries = fs::read_dir(&self.commands_dir).await.with_context(|| {
            format!(
                "Failed to read commands directory: {}",
                self.commands_dir.display()
            )
        })?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();

            // Skip non-command files
            if !Self::is_command_file(&path) {
                continue;
            }

            let file_name = path
                .file_stem()
                .and_then(|name| name.to_str())
                .unwrap_or("")
                .to_string();

            let metadata = entry.metadata().await?;
            let modified = metadata.modified()?;

            let command_file = self.get_or_load_command(path, &file_name, modified).await?;
            commands.push(command_file);
        }

        self.last_scan = Some(SystemTime::now());
        Ok(commands)
    }

    /// Check if the discovery cache needs refreshing
    pub fn needs_refresh(&self) -> bool {
        self.last_scan.is_none()
    }

    /// Clear the cache to force a full rescan on next `scan_commands` call
    pub fn clear_cache(&mut self) {
        self.cache.clear();
        self.last_scan = None;
    }
}

/// Represents a discovered command file with its metadata
#[derive(Clone, Debug)]
pub struct CommandFile {
    pub path: PathBuf,
    pub name: String,
    pub content: String,
    pub modified: SystemTime,
}
