//! A directory full of repositories.
//!
//! A [`Workspace`] scans its directory once: every immediate child with a
//! `.git` or `.hg` directory becomes a [`Repo`]; everything else is garbage
//! unless its name is ignored. Virtualenv artifacts are ignored automatically
//! when the workspace itself is a virtualenv (it has a `pyvenv.cfg`).

use crate::core::{
    ancestry::AncestryCache,
    cache::ResultCache,
    error::Result,
    inspector::Backend,
    repo::{contains_path, Repo},
    status::ProjectStatus,
};
use std::fs;
use std::path::{Path, PathBuf};

/// Marker file present at the root of a Python virtualenv
pub const VENV_MARKER: &str = "pyvenv.cfg";

/// Entries a virtualenv creates next to its marker
pub const VENV_ARTIFACTS: &[&str] = &[
    "bin",
    "include",
    "lib",
    "lib64",
    "share",
    "pyvenv.cfg",
    "Include",
    "Lib",
    "Scripts",
];

#[derive(Debug)]
pub struct Workspace {
    name: String,
    path: PathBuf,
    repos: Vec<Repo>,
    garbage: Vec<String>,
    ignore: Vec<String>,
}

impl Workspace {
    /// Assemble a workspace from already-built parts
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        repos: Vec<Repo>,
        garbage: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            repos,
            garbage,
            ignore: Vec::new(),
        }
    }

    /// Scan `path` for repositories, wiring each one to `cache`
    pub fn scan(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        mut ignore: Vec<String>,
        cache: &ResultCache,
    ) -> Result<Self> {
        let path = path.into();
        let ancestry = AncestryCache::new(cache);

        if path.join(VENV_MARKER).is_file() {
            log::debug!("{} is a virtualenv", path.display());
            ignore.extend(VENV_ARTIFACTS.iter().map(|s| s.to_string()));
        }

        let mut entries = fs::read_dir(&path)?.collect::<std::io::Result<Vec<_>>>()?;
        entries.sort_by_key(|entry| entry.file_name());

        let mut repos = Vec::new();
        let mut garbage = Vec::new();

        for entry in entries {
            let child_name = entry.file_name().to_string_lossy().into_owned();
            let child_path = entry.path();

            match Backend::detect(&child_path) {
                Some(backend) => {
                    let inspector = backend.inspector(&child_path, &ancestry);
                    repos.push(Repo::new(child_name, child_path, inspector, cache.clone()));
                }
                None if ignore.contains(&child_name) => {}
                None => garbage.push(child_name),
            }
        }

        log::debug!(
            "Workspace {} has {} repos and {} garbage entries",
            path.display(),
            repos.len(),
            garbage.len()
        );

        Ok(Self {
            name: name.into(),
            path,
            repos,
            garbage,
            ignore,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn repos(&self) -> &[Repo] {
        &self.repos
    }

    /// Entries that are neither repositories nor ignored
    pub fn garbage(&self) -> &[String] {
        &self.garbage
    }

    pub fn ignore(&self) -> &[String] {
        &self.ignore
    }

    /// Worst status among the child repos, with garbage ranking just above
    /// clean
    pub fn status(&self, can_inspect: bool) -> Result<ProjectStatus> {
        let mut worst = if self.garbage.is_empty() {
            ProjectStatus::Clean
        } else {
            ProjectStatus::Garbage
        };

        for repo in &self.repos {
            worst = worst.worst(repo.status(can_inspect)?);
        }

        Ok(worst)
    }

    pub fn contains_path(&self, path: &Path) -> bool {
        contains_path(&self.path, path)
    }

    pub fn clear_cache(&self, keep_outgoing: bool) -> Result<()> {
        self.repos
            .iter()
            .try_for_each(|repo| repo.clear_cache(keep_outgoing))
    }
}
