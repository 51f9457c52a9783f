//! Memoized commit ancestry checks.
//!
//! Whether commit A is an ancestor of commit B never changes for a fixed pair
//! of SHAs, so results are kept for a long time and only expire to bound
//! storage. Entries are keyed by the *ordered* pair: `(a, b)` and `(b, a)`
//! occupy independent slots.

use crate::core::{
    cache::{path_key, ResultCache},
    error::Result,
};
use std::path::Path;
use std::time::Duration;

/// Ancestry results are kept for 30 days
pub const ANCESTRY_EXPIRY: Duration = Duration::from_secs(30 * 24 * 60 * 60);

const SUBDIRECTORY: &str = "ancestry";

#[derive(Debug, Clone)]
pub struct AncestryCache {
    cache: ResultCache,
}

impl AncestryCache {
    /// Store ancestry entries in a subdirectory of `cache`
    pub fn new(cache: &ResultCache) -> Self {
        Self {
            cache: cache.subcache(SUBDIRECTORY),
        }
    }

    fn key(repo_path: &Path, ancestor: &str, descendant: &str) -> String {
        format!("{}...{ancestor}...{descendant}", path_key(repo_path))
    }

    pub fn get(&self, repo_path: &Path, ancestor: &str, descendant: &str) -> Option<bool> {
        self.cache
            .get(&Self::key(repo_path, ancestor, descendant), ANCESTRY_EXPIRY)
    }

    pub fn set(
        &self,
        repo_path: &Path,
        ancestor: &str,
        descendant: &str,
        is_ancestor: bool,
    ) -> Result<()> {
        self.cache
            .set(&Self::key(repo_path, ancestor, descendant), &is_ancestor)
    }

    /// Is `ancestor` in the history of `descendant`? `compute` only runs on a
    /// cache miss.
    pub fn is_ancestor<F>(
        &self,
        repo_path: &Path,
        ancestor: &str,
        descendant: &str,
        compute: F,
    ) -> Result<bool>
    where
        F: FnOnce() -> Result<bool>,
    {
        if let Some(known) = self.get(repo_path, ancestor, descendant) {
            return Ok(known);
        }

        let result = compute()?;
        if let Err(e) = self.set(repo_path, ancestor, descendant, result) {
            log::warn!("Ancestry cache save failed (continuing): {e}");
        }
        Ok(result)
    }
}
