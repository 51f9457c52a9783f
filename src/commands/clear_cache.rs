use crate::core::{
    cache::ResultCache, command_init::CommandContext, error::Result, output::print_success,
    repo::clear_cache_for,
};
use std::fs;
use std::path::{Path, PathBuf};

fn looks_like_repo(dir: &Path) -> bool {
    dir.join(".git").exists() || dir.join(".hg").exists()
}

/// Clear cached results for every repository at or above each of `paths`.
/// `keep_outgoing` leaves the (expensive) outgoing entries alone.
pub fn clear_cache_for_paths(
    cache: &ResultCache,
    paths: &[PathBuf],
    keep_outgoing: bool,
) -> Result<Vec<PathBuf>> {
    let mut cleared = Vec::new();

    for path in paths {
        let real = fs::canonicalize(path)?;
        // the filesystem root is never a project
        for dir in real.ancestors().filter(|dir| dir.parent().is_some()) {
            if looks_like_repo(dir) {
                log::debug!("Clearing cache for {}", dir.display());
                clear_cache_for(cache, dir, keep_outgoing)?;
                cleared.push(dir.to_path_buf());
            }
        }
    }

    Ok(cleared)
}

pub fn execute_clear_cache(paths: Vec<PathBuf>, local: bool) -> Result<()> {
    let context = CommandContext::initialize()?;
    let cleared = clear_cache_for_paths(&context.cache, &paths, local)?;

    for dir in &cleared {
        print_success(&format!("Cleared cache for {}", dir.display()));
    }
    Ok(())
}
