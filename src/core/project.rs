use crate::core::{error::Result, repo::Repo, status::ProjectStatus, workspace::Workspace};
use std::path::Path;

/// Anything the enumerator yields: a single repo or a workspace of repos
#[derive(Debug)]
pub enum Project {
    Repo(Repo),
    Workspace(Workspace),
}

impl Project {
    pub fn name(&self) -> &str {
        match self {
            Project::Repo(repo) => repo.name(),
            Project::Workspace(ws) => ws.name(),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Project::Repo(repo) => repo.path(),
            Project::Workspace(ws) => ws.path(),
        }
    }

    pub fn status(&self, can_inspect: bool) -> Result<ProjectStatus> {
        match self {
            Project::Repo(repo) => repo.status(can_inspect),
            Project::Workspace(ws) => ws.status(can_inspect),
        }
    }

    pub fn contains_path(&self, path: &Path) -> bool {
        match self {
            Project::Repo(repo) => repo.contains_path(path),
            Project::Workspace(ws) => ws.contains_path(path),
        }
    }

    /// Whether `name_or_path` names this project or a path inside it
    pub fn matches(&self, name_or_path: &str) -> bool {
        self.name() == name_or_path || self.contains_path(Path::new(name_or_path))
    }

    /// Workspaces are never spotlighted
    pub fn is_spotlight(&self) -> bool {
        match self {
            Project::Repo(repo) => repo.is_spotlight(),
            Project::Workspace(_) => false,
        }
    }

    pub fn clear_cache(&self, keep_outgoing: bool) -> Result<()> {
        match self {
            Project::Repo(repo) => repo.clear_cache(keep_outgoing),
            Project::Workspace(ws) => ws.clear_cache(keep_outgoing),
        }
    }

    pub fn as_workspace(&self) -> Option<&Workspace> {
        match self {
            Project::Workspace(ws) => Some(ws),
            Project::Repo(_) => None,
        }
    }
}

impl From<Repo> for Project {
    fn from(repo: Repo) -> Self {
        Project::Repo(repo)
    }
}

impl From<Workspace> for Project {
    fn from(ws: Workspace) -> Self {
        Project::Workspace(ws)
    }
}
