//! Test data generation utilities and predefined scenarios
//!
//! Provides functions for creating workspaces and config files with specific
//! repository states to test status classification consistently.

#![allow(dead_code)]

use super::repository::*;
use jerjerrod::core::error::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A workspace directory plus isolated config and cache homes
pub struct TestWorkspace {
    pub temp_dir: TempDir,
    pub root: PathBuf,
    pub config_home: PathBuf,
    pub cache_home: PathBuf,
}

impl TestWorkspace {
    pub fn repo(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// `$XDG_CONFIG_HOME/jerjerrod/jerjerrod.conf`
    pub fn config_file(&self) -> PathBuf {
        self.config_home.join("jerjerrod").join("jerjerrod.conf")
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.cache_home.join("jerjerrod")
    }

    pub fn write_config(&self, text: &str) -> Result<()> {
        let file = self.config_file();
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(file, text)?;
        Ok(())
    }
}

/// Scenario: a workspace "ws" with three clones of one bare origin
/// - `clean`: up to date with origin
/// - `dirty`: a modified tracked file
/// - `fresh`: an untracked file
///
/// plus a stray `notes.txt` (garbage).
pub fn create_workspace() -> Result<TestWorkspace> {
    let temp_dir = TempDir::new()?;
    let base = fs::canonicalize(temp_dir.path())?;
    let root = base.join("ws");
    let origin = base.join("origin.git");

    fs::create_dir_all(&origin)?;
    git(&origin, &["init", "--bare", "-b", "main"])?;
    let seed = base.join("seed");
    init_repo(&seed)?;
    commit_file(&seed, "initial.txt", "initial content\n")?;
    git(&seed, &["push", &origin.to_string_lossy(), "main"])?;

    fs::create_dir_all(&root)?;
    for name in ["clean", "dirty", "fresh"] {
        let repo = root.join(name);
        git(&root, &["clone", &origin.to_string_lossy(), &repo.to_string_lossy()])?;
        git(&repo, &["config", "user.name", "Test User"])?;
        git(&repo, &["config", "user.email", "test@example.com"])?;
    }
    create_file(&root.join("dirty"), "initial.txt", "modified content\n")?;
    create_file(&root.join("fresh"), "new.txt", "untracked\n")?;
    create_file(&root, "notes.txt", "todo\n")?;

    Ok(TestWorkspace {
        temp_dir,
        root,
        config_home: base.join("config"),
        cache_home: base.join("cache"),
    })
}

/// Config text declaring each repo in the workspace as a single project
pub fn projects_config(workspace: &TestWorkspace, names: &[&str]) -> String {
    names
        .iter()
        .map(|name| format!("PROJECT {}\n", workspace.repo(name).display()))
        .collect()
}

/// Config text declaring the whole workspace
pub fn workspace_config(root: &Path) -> String {
    format!("WORKSPACE {}\n", root.display())
}
