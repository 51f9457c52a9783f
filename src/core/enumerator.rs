//! Turns config directives into projects.
//!
//! Workspaces are keyed by directory name (a later declaration with the same
//! name replaces an earlier one) and come out sorted by name; single projects
//! follow in declaration order. `FORGET` drops the first single project
//! declared at exactly that path.

use crate::core::{
    ancestry::AncestryCache,
    cache::ResultCache,
    config::Directive,
    error::{ConfigError, Result},
    inspector::Backend,
    project::Project,
    repo::Repo,
    workspace::Workspace,
};
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug)]
struct Single {
    name: String,
    path: PathBuf,
    spotlight: bool,
}

#[derive(Debug, Clone)]
pub struct ProjectEnumerator {
    cache: ResultCache,
}

impl ProjectEnumerator {
    pub fn new(cache: ResultCache) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Build every declared project, wired to the shared cache
    pub fn enumerate(&self, directives: &[Directive]) -> Result<Vec<Project>> {
        let mut workspaces: BTreeMap<String, (PathBuf, Vec<String>)> = BTreeMap::new();
        let mut singles: Vec<Single> = Vec::new();

        for directive in directives {
            match directive {
                Directive::Workspace { pattern, ignore } => {
                    for (name, path) in expand_glob(pattern)? {
                        workspaces.insert(name, (path, ignore.clone()));
                    }
                }
                Directive::Project { pattern, spotlight } => {
                    for (name, path) in expand_glob(pattern)? {
                        singles.push(Single {
                            name,
                            path,
                            spotlight: *spotlight,
                        });
                    }
                }
                Directive::Forget { path } => {
                    let target = resolve(Path::new(path));
                    if let Some(index) = singles.iter().position(|single| single.path == target) {
                        log::debug!("Forgetting {}", target.display());
                        singles.remove(index);
                    }
                }
            }
        }

        let mut projects: Vec<Project> = Vec::with_capacity(workspaces.len() + singles.len());

        for (name, (path, ignore)) in workspaces {
            projects.push(Workspace::scan(name, path, ignore, &self.cache)?.into());
        }

        let ancestry = AncestryCache::new(&self.cache);
        for single in singles {
            let backend = Backend::detect(&single.path).ok_or_else(|| {
                ConfigError::BadProjectPath {
                    path: single.path.clone(),
                }
            })?;
            let inspector = backend.inspector(&single.path, &ancestry);
            let repo = Repo::new(single.name, single.path, inspector, self.cache.clone())
                .with_spotlight(single.spotlight);
            projects.push(repo.into());
        }

        Ok(projects)
    }
}

/// Matches of `pattern` as (basename, resolved path) pairs
fn expand_glob(pattern: &str) -> Result<Vec<(String, PathBuf)>> {
    let paths = glob::glob(pattern).map_err(|_| ConfigError::InvalidGlob {
        line: 0,
        pattern: pattern.to_string(),
    })?;

    let mut matches = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) => {
                let name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.to_string_lossy().into_owned());
                matches.push((name, resolve(&path)));
            }
            Err(e) => log::warn!("Skipping unreadable match for {pattern}: {e}"),
        }
    }

    if matches.is_empty() {
        log::debug!("{pattern} matched nothing");
    }
    Ok(matches)
}

fn resolve(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// First project named `name_or_path`, or containing that path
pub fn find_project<P>(projects: impl IntoIterator<Item = P>, name_or_path: &str) -> Option<P>
where
    P: Borrow<Project>,
{
    projects
        .into_iter()
        .find(|project| project.borrow().matches(name_or_path))
}
