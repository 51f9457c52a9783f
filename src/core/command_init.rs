//! Centralized initialization for project commands.
//!
//! Every command needs the same three things: the result cache, the config
//! file location, and the projects the config declares. [`CommandContext`]
//! resolves the default locations once and builds projects on demand.
//!
//! # Initialization Steps
//! 1. **Cache directory**: `$XDG_CACHE_HOME/jerjerrod` (created lazily on write)
//! 2. **Config file**: `$XDG_CONFIG_HOME/jerjerrod/jerjerrod.conf`
//! 3. **Projects**: parsed directives expanded by [`ProjectEnumerator`]

use crate::core::{
    cache::ResultCache,
    config::{load_config, ConfigCache},
    dirs::get_config_file,
    enumerator::{find_project, ProjectEnumerator},
    error::{JerjerrodError, Result},
    project::Project,
};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct CommandContext {
    pub cache: ResultCache,
    pub config_file: PathBuf,
}

impl CommandContext {
    /// Context rooted at the user's config and cache directories
    pub fn initialize() -> Result<Self> {
        let cache = ResultCache::open_default()?;
        let config_file = get_config_file()?;
        log::debug!(
            "Using config {} and cache {}",
            config_file.display(),
            cache.dir().display()
        );
        Ok(Self::new(cache, config_file))
    }

    pub fn new(cache: ResultCache, config_file: impl Into<PathBuf>) -> Self {
        Self {
            cache,
            config_file: config_file.into(),
        }
    }

    pub fn enumerator(&self) -> ProjectEnumerator {
        ProjectEnumerator::new(self.cache.clone())
    }

    /// A config cache over this context's config file
    pub fn config_cache(&self) -> ConfigCache {
        ConfigCache::new(&self.config_file)
    }

    /// Every project the config file declares
    pub fn load_projects(&self) -> Result<Vec<Project>> {
        let directives = load_config(&self.config_file)?;
        self.enumerator().enumerate(&directives)
    }

    /// The project named `name_or_path` or containing that path
    pub fn find_project(&self, name_or_path: &str) -> Result<Project> {
        find_project(self.load_projects()?, name_or_path)
            .ok_or_else(|| JerjerrodError::project_not_found(name_or_path))
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }
}
