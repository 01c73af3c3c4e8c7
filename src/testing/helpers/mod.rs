//! Test helper functions and custom assertions

pub mod assertions;

use anyhow::Result;
use std::path::Path;
use tempfile::TempDir;

/// Create a temporary directory with a git repository initialized
pub async fn create_test_repo() -> Result<TempDir> {
    let temp_dir = TempDir::new()?;

    // Initialize git repo
    std::process::Command::new("git")
        .args(["init"])
        .current_dir(temp_dir.path())
        .output()?;

    // Configure git user
    std::process::Command::new("git")
        .args(["config", "user.email", "test@example.com"])
        .current_dir(temp_dir.path())
        .output()?;

    std::process::Command::new("git")
        .args(["config", "user.name", "Test User"])
        .current_dir(temp_dir.path())
        .output()?;

    Ok(temp_dir)
}

/// Create a test file with content in a directory
pub fn create_file(dir: &Path, relative_path: &str, content: &str) -> Result<()> {
    let file_path = dir.join(relative_path);
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file_path, content)?;
    Ok(())
}

/// Create a standard Rust project structure
pub fn create_rust_project(dir: &Path) -> Result<()> {
    // Create directories
    std::fs::create_dir_all(dir.join("src"))?;
    std::fs::create_dir_all(dir.join("tests"))?;

    // Create Cargo.toml
    create_file(
        dir,
        "Cargo.toml",
        r#"[package]
name = "test_project"
version = "0.1.0"
edition = "2021"

[dependencies]
anyhow = "1.0"
"#,
    )?;

    // Create main.rs
    create_file(
        dir,
        "src/main.rs",
        "fn main() {\n    println!(\"Hello, world!\");\n}",
    )?;

    // Create lib.rs
    create_file(
        dir,
        "src/lib.rs",
        "pub fn add(a: i32, b: i32) -> i32 {\n    a + b\n}",
    )?;

    Ok(())
}

/// Helper to run a command and capture output
pub async fn run_command(command: &str, args: &[&str], dir: &Path) -> Result<String> {
    let output = tokio::process::Command::new(command)
        .args(args)
        .current_dir(dir)
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow::anyhow!("Command failed: {}", stderr));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Check if a file contains specific content
pub fn file_contains(path: &Path, content: &str) -> Result<bool> {
    let file_content = std::fs::read_to_string(path)?;
    Ok(file_content.contains(content))
}

/// Get the number of files in a directory (recursively)
pub fn count_files(dir: &Path) -> Result<usize> {
    let mut count = 0;
    for entry in walkdir::WalkDir::new(dir) {
        let entry = entry?;
        if entry.file_type().is_file() {
            count += 1;
        }
    }
    Ok(count)
}

/// Compare two directories for equality
pub fn dirs_equal(dir1: &Path, dir2: &Path) -> Result<bool> {
    use std::collections::HashSet;

    let files1: HashSet<_> = walkdir::WalkDir::new(dir1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().strip_prefix(dir1).unwrap().to_path_buf())
        .collect();

    let files2: HashSet<_> = walkdir::WalkDir::new(dir2)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().strip_prefix(dir2).unwrap().to_path_buf())
        .collect();

    if files1 != files2 {
        return Ok(false);
    }

    // Compare file contents
    for file in files1 {
        let content1 = std::fs::read_to_string(dir1.join(&file))?;
        let content2 = std::fs::read_to_string(dir2.join(&file))?;
        if content1 != content2 {
            return Ok(false);
        }
    }

    Ok(true)
}
