//! Git repository management and setup utilities
//!
//! Provides functions for creating test repositories, bare remotes and clones
//! with various states for the inspection and outgoing-commit tests.

#![allow(dead_code)]

use jerjerrod::core::error::{JerjerrodError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Test repository setup result containing both the temporary directory
/// and the repository path. The TempDir must be kept alive for the duration
/// of the test to prevent cleanup.
pub struct TestRepo {
    pub temp_dir: TempDir,
    pub path: PathBuf,
}

impl TestRepo {
    /// Get the repository path as a reference
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// A bare "origin" and a clone of it, both inside one temporary directory
pub struct ClonedRepo {
    pub temp_dir: TempDir,
    pub origin: PathBuf,
    pub path: PathBuf,
}

impl ClonedRepo {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Run git in `dir`, failing on a nonzero exit
pub fn git(dir: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .args(["-c", "commit.gpgsign=false", "-c", "init.defaultBranch=main"])
        .args(args)
        .current_dir(dir)
        .output()?;

    if !output.status.success() {
        return Err(JerjerrodError::command_failed(
            format!("git {}", args.join(" ")),
            output.status,
            &output.stderr,
        ));
    }
    Ok(String::from_utf8(output.stdout)?)
}

fn configure_user(dir: &Path) -> Result<()> {
    git(dir, &["config", "user.name", "Test User"])?;
    git(dir, &["config", "user.email", "test@example.com"])?;
    Ok(())
}

/// Initialize a git repository (with user config) at `path`
pub fn init_repo(path: &Path) -> Result<()> {
    fs::create_dir_all(path)?;
    git(path, &["init", "-b", "main"])?;
    configure_user(path)
}

/// Sets up a fresh git repository for testing
pub fn setup_test_repo() -> Result<TestRepo> {
    let temp_dir = TempDir::new()?;
    let path = fs::canonicalize(temp_dir.path())?.join("repo");
    init_repo(&path)?;

    Ok(TestRepo { temp_dir, path })
}

/// Sets up a git repository with an initial commit of "initial.txt"
pub fn setup_test_repo_with_initial_commit() -> Result<TestRepo> {
    let repo = setup_test_repo()?;
    commit_file(&repo.path, "initial.txt", "initial content\n")?;
    Ok(repo)
}

/// Sets up a bare origin with one commit on `main` and a clone tracking it
pub fn setup_cloned_repo() -> Result<ClonedRepo> {
    let temp_dir = TempDir::new()?;
    let root = fs::canonicalize(temp_dir.path())?;
    let origin = root.join("origin.git");
    let path = root.join("clone");

    fs::create_dir_all(&origin)?;
    git(&origin, &["init", "--bare", "-b", "main"])?;

    // seed the remote from a scratch repository so the clone has history
    let seed = root.join("seed");
    init_repo(&seed)?;
    commit_file(&seed, "initial.txt", "initial content\n")?;
    git(&seed, &["push", &origin.to_string_lossy(), "main"])?;

    git(&root, &["clone", &origin.to_string_lossy(), &path.to_string_lossy()])?;
    configure_user(&path)?;

    Ok(ClonedRepo {
        temp_dir,
        origin,
        path,
    })
}

/// Creates a file with specified content in the repository
pub fn create_file(repo_path: &Path, filename: &str, content: &str) -> Result<()> {
    let file = repo_path.join(filename);
    if let Some(parent) = file.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(file, content)?;
    Ok(())
}

/// Write, add and commit a single file
pub fn commit_file(repo_path: &Path, filename: &str, content: &str) -> Result<()> {
    create_file(repo_path, filename, content)?;
    git(repo_path, &["add", filename])?;
    git(repo_path, &["commit", "-m", &format!("update {filename}")])?;
    Ok(())
}

/// Object id of `rev`
pub fn rev_parse(repo_path: &Path, rev: &str) -> Result<String> {
    Ok(git(repo_path, &["rev-parse", rev])?.trim().to_string())
}
