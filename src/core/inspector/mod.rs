//! Version-control inspection backends.
//!
//! An [`Inspector`] answers the handful of questions jerjerrod asks about a
//! working tree: the current branch, which paths are changed or untracked,
//! how many stashes exist, and whether any commits are outgoing. Each backend
//! runs its status command at most once per instance and memoizes the parse.
//!
//! # Public API
//! - [`Inspector`]: the backend-independent interface
//! - [`GitInspector`], [`HgInspector`]: the two backends
//! - [`Backend`]: marker-directory detection and inspector construction
//! - [`StatusLines`]: parsed status output

pub mod git;
pub mod hg;

pub use git::GitInspector;
pub use hg::HgInspector;

use crate::core::{ancestry::AncestryCache, error::Result, info::Outgoing};
use std::cell::OnceCell;
use std::path::Path;

/// Paths reported by a VCS status command, split by category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusLines {
    pub changed: Vec<String>,
    pub untracked: Vec<String>,
}

pub trait Inspector {
    /// Current branch; `None` when there is no branch (e.g. detached HEAD)
    fn branch(&self) -> Result<Option<String>>;

    /// Parsed status output, computed on first use
    fn status_lines(&self) -> Result<&StatusLines>;

    fn stash_count(&self) -> Result<usize>;

    fn outgoing(&self) -> Result<Outgoing>;

    /// Whether `outgoing()` is slow enough (e.g. contacts a remote) to deserve
    /// its own longer-lived cache entry
    fn outgoing_expensive(&self) -> bool;

    fn changed(&self) -> Result<Vec<String>> {
        Ok(self.status_lines()?.changed.clone())
    }

    fn untracked(&self) -> Result<Vec<String>> {
        Ok(self.status_lines()?.untracked.clone())
    }
}

/// Supported version control systems
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Git,
    Mercurial,
}

impl Backend {
    /// Detect the backend from a marker directory inside `path`
    pub fn detect(path: &Path) -> Option<Backend> {
        if path.join(".git").is_dir() {
            Some(Backend::Git)
        } else if path.join(".hg").is_dir() {
            Some(Backend::Mercurial)
        } else {
            None
        }
    }

    pub fn inspector(&self, path: &Path, ancestry: &AncestryCache) -> Box<dyn Inspector> {
        match self {
            Backend::Git => Box::new(GitInspector::new(path, ancestry.clone())),
            Backend::Mercurial => Box::new(HgInspector::new(path)),
        }
    }
}

/// `OnceCell::get_or_try_init` for stable Rust
pub(crate) fn memoized<F>(cell: &OnceCell<StatusLines>, parse: F) -> Result<&StatusLines>
where
    F: FnOnce() -> Result<StatusLines>,
{
    if let Some(lines) = cell.get() {
        return Ok(lines);
    }
    let lines = parse()?;
    Ok(cell.get_or_init(|| lines))
}
