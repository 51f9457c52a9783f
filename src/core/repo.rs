//! A single working tree and its cached status.
//!
//! [`Repo`] owns the "get info, possibly from cache, possibly refreshed"
//! protocol:
//! 1. a fresh cache entry (younger than [`PROJECT_EXPIRY`]) wins;
//! 2. otherwise any older entry is kept as a stale fallback;
//! 3. without permission to inspect, the stale entry (or nothing) is used;
//! 4. otherwise the inspector is queried and the result cached.
//!
//! Outgoing status has its own cache entry for backends whose check is
//! expensive, and a transient "unknown" outgoing result never replaces a
//! previously known value.

use crate::core::{
    cache::{outgoing_key, path_key, ResultCache, OUTGOING_EXPIRY, PROJECT_EXPIRY},
    error::Result,
    info::{Outgoing, RepoInfo},
    inspector::Inspector,
    status::ProjectStatus,
};
use std::cell::OnceCell;
use std::path::{Path, PathBuf};

/// Classify an info record; first match wins
pub fn classify(info: &RepoInfo) -> ProjectStatus {
    if !info.changed.is_empty() || info.stashes > 0 {
        ProjectStatus::Changed
    } else if !info.untracked.is_empty() {
        ProjectStatus::Untracked
    } else if info.outgoing.is_truthy() {
        ProjectStatus::Unpushed
    } else {
        ProjectStatus::Clean
    }
}

pub struct Repo {
    name: String,
    path: PathBuf,
    inspector: Box<dyn Inspector>,
    cache: ResultCache,
    spotlight: bool,
    info: OnceCell<RepoInfo>,
}

impl std::fmt::Debug for Repo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repo")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("spotlight", &self.spotlight)
            .finish()
    }
}

impl Repo {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        inspector: Box<dyn Inspector>,
        cache: ResultCache,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            inspector,
            cache,
            spotlight: false,
            info: OnceCell::new(),
        }
    }

    pub fn with_spotlight(mut self, spotlight: bool) -> Self {
        self.spotlight = spotlight;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_spotlight(&self) -> bool {
        self.spotlight
    }

    fn cache_key(&self) -> String {
        path_key(&self.path)
    }

    /// The repo's info, or `None` when nothing is cached and `can_inspect`
    /// is false
    pub fn info(&self, can_inspect: bool) -> Result<Option<RepoInfo>> {
        if let Some(info) = self.info.get() {
            return Ok(Some(info.clone()));
        }

        // peek rather than get: an expired entry must survive as the fallback
        let key = self.cache_key();
        let stale = match self.cache.peek::<RepoInfo>(&key) {
            Some(entry) if entry.is_fresh(PROJECT_EXPIRY) => {
                return Ok(Some(self.info.get_or_init(|| entry.value).clone()));
            }
            entry => entry.map(|entry| entry.value),
        };

        if !can_inspect {
            return Ok(stale);
        }

        let info = self.inspect(stale.as_ref())?;
        if let Err(e) = self.cache.set(&key, &info) {
            log::warn!("Cache save failed for {} (continuing): {e}", self.path.display());
        }
        Ok(Some(self.info.get_or_init(|| info).clone()))
    }

    fn inspect(&self, stale: Option<&RepoInfo>) -> Result<RepoInfo> {
        log::debug!("Inspecting {}", self.path.display());

        let branch = self.inspector.branch()?;
        let changed = self.inspector.changed()?;
        let untracked = self.inspector.untracked()?;
        let outgoing = self.outgoing(stale)?;
        let stashes = self.inspector.stash_count()?;

        Ok(RepoInfo {
            branch,
            changed,
            untracked,
            outgoing,
            stashes,
        })
    }

    fn outgoing(&self, stale: Option<&RepoInfo>) -> Result<Outgoing> {
        let key = outgoing_key(&self.cache_key());
        let cached = self.cache.peek::<Outgoing>(&key);

        if self.inspector.outgoing_expensive() {
            if let Some(entry) = cached.as_ref().filter(|e| e.is_fresh(OUTGOING_EXPIRY)) {
                return Ok(entry.value.clone());
            }
        }

        let live = self.inspector.outgoing()?;
        if live.is_unknown() {
            // the main record first, then the outgoing entry it may have outlived
            let previous = stale
                .map(|info| info.outgoing.clone())
                .into_iter()
                .chain(cached.map(|entry| entry.value))
                .find(|outgoing| !outgoing.is_unknown());
            if let Some(previous) = previous {
                log::debug!(
                    "Outgoing check for {} inconclusive, keeping {previous}",
                    self.path.display()
                );
                return Ok(previous);
            }
        }

        if let Err(e) = self.cache.set(&key, &live) {
            log::warn!("Outgoing cache save failed (continuing): {e}");
        }
        Ok(live)
    }

    pub fn status(&self, can_inspect: bool) -> Result<ProjectStatus> {
        Ok(match self.info(can_inspect)? {
            Some(info) => classify(&info),
            None => ProjectStatus::Unknown,
        })
    }

    /// Whether `path` lies inside this repo
    pub fn contains_path(&self, path: &Path) -> bool {
        contains_path(&self.path, path)
    }

    /// Forget cached results; `keep_outgoing` leaves the outgoing entry
    pub fn clear_cache(&self, keep_outgoing: bool) -> Result<()> {
        clear_cache_for(&self.cache, &self.path, keep_outgoing)
    }
}

pub(crate) fn contains_path(root: &Path, path: &Path) -> bool {
    match std::fs::canonicalize(path) {
        Ok(real) => real.starts_with(root),
        Err(_) => path.starts_with(root),
    }
}

/// Clear the cache entries belonging to the repo at `path`
pub fn clear_cache_for(cache: &ResultCache, path: &Path, keep_outgoing: bool) -> Result<()> {
    let key = path_key(path);
    cache.clear(&key)?;
    if !keep_outgoing {
        cache.clear(&outgoing_key(&key))?;
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::{cache::STALE_EXPIRY, error::ParseError, inspector::StatusLines};
    use std::cell::Cell;
    use std::rc::Rc;
    use tempfile::TempDir;

    /// Call counters shared between a test and its [`FakeInspector`]
    #[derive(Debug, Default)]
    pub struct Calls {
        pub outgoing: Cell<usize>,
        pub status: Cell<usize>,
    }

    /// Inspector answering from fixed values
    pub struct FakeInspector {
        pub branch: Option<String>,
        pub lines: StatusLines,
        pub stashes: usize,
        pub outgoing: Outgoing,
        pub expensive: bool,
        pub broken: bool,
        pub calls: Rc<Calls>,
    }

    impl Default for FakeInspector {
        fn default() -> Self {
            Self {
                branch: Some("main".to_string()),
                lines: StatusLines::default(),
                stashes: 0,
                outgoing: Outgoing::Count(0),
                expensive: false,
                broken: false,
                calls: Rc::new(Calls::default()),
            }
        }
    }

    impl Inspector for FakeInspector {
        fn branch(&self) -> Result<Option<String>> {
            Ok(self.branch.clone())
        }

        fn status_lines(&self) -> Result<&StatusLines> {
            self.calls.status.set(self.calls.status.get() + 1);
            if self.broken {
                return Err(ParseError::new("fake status", "?? ").into());
            }
            Ok(&self.lines)
        }

        fn stash_count(&self) -> Result<usize> {
            Ok(self.stashes)
        }

        fn outgoing(&self) -> Result<Outgoing> {
            self.calls.outgoing.set(self.calls.outgoing.get() + 1);
            Ok(self.outgoing.clone())
        }

        fn outgoing_expensive(&self) -> bool {
            self.expensive
        }
    }

    pub fn setup_cache() -> (TempDir, ResultCache) {
        let temp_dir = TempDir::new().unwrap();
        let cache = ResultCache::new(
            temp_dir.path().join("cache"),
            temp_dir.path().join("ignore.json"),
        );
        (temp_dir, cache)
    }

    fn repo_with(cache: &ResultCache, inspector: FakeInspector) -> Repo {
        Repo::new("project", "/src/project", Box::new(inspector), cache.clone())
    }

    fn info(changed: &[&str], untracked: &[&str], stashes: usize, outgoing: Outgoing) -> RepoInfo {
        RepoInfo {
            branch: Some("main".to_string()),
            changed: changed.iter().map(|s| s.to_string()).collect(),
            untracked: untracked.iter().map(|s| s.to_string()).collect(),
            outgoing,
            stashes,
        }
    }

    #[test]
    fn test_classify_precedence() {
        assert_eq!(classify(&info(&[], &[], 0, Outgoing::Count(0))), ProjectStatus::Clean);
        assert_eq!(
            classify(&info(&[], &["x"], 1, Outgoing::AtLeastOne)),
            ProjectStatus::Changed
        );
        assert_eq!(
            classify(&info(&[], &[], 1, Outgoing::Count(0))),
            ProjectStatus::Changed
        );
        assert_eq!(
            classify(&info(&[], &["x"], 0, Outgoing::Count(3))),
            ProjectStatus::Untracked
        );
        assert_eq!(
            classify(&info(&[], &[], 0, Outgoing::Unreachable)),
            ProjectStatus::Unpushed
        );
        assert_eq!(
            classify(&info(&["a"], &[], 0, Outgoing::Count(0))),
            ProjectStatus::Changed
        );
    }

    #[test]
    fn test_unknown_without_cache_or_inspection() {
        let (_temp_dir, cache) = setup_cache();
        let fake = FakeInspector::default();
        let calls = Rc::clone(&fake.calls);
        let repo = repo_with(&cache, fake);

        assert_eq!(repo.status(false).unwrap(), ProjectStatus::Unknown);
        assert_eq!(calls.status.get(), 0);
    }

    #[test]
    fn test_inspection_is_cached_and_memoized() {
        let (_temp_dir, cache) = setup_cache();
        let fake = FakeInspector {
            stashes: 1,
            ..Default::default()
        };
        let calls = Rc::clone(&fake.calls);
        let repo = repo_with(&cache, fake);

        assert_eq!(repo.status(true).unwrap(), ProjectStatus::Changed);
        assert_eq!(repo.status(true).unwrap(), ProjectStatus::Changed);
        assert_eq!(calls.outgoing.get(), 1);

        let cached: RepoInfo = cache.get("/src/project", PROJECT_EXPIRY).unwrap();
        assert_eq!(cached.stashes, 1);

        // a second process reads the cache instead of inspecting
        let again = FakeInspector::default();
        let again_calls = Rc::clone(&again.calls);
        let repo = repo_with(&cache, again);
        assert_eq!(repo.status(false).unwrap(), ProjectStatus::Changed);
        assert_eq!(again_calls.status.get(), 0);
    }

    #[test]
    fn test_stale_value_used_when_inspection_disallowed() {
        let (_temp_dir, cache) = setup_cache();
        cache
            .set("/src/project", &info(&[], &["new.txt"], 0, Outgoing::Count(0)))
            .unwrap();

        let much_later = cache.clone().with_clock(std::sync::Arc::new(
            crate::core::clock::FixedClock::ahead_by(PROJECT_EXPIRY * 3),
        ));
        let repo = repo_with(&much_later, FakeInspector::default());
        assert_eq!(repo.status(false).unwrap(), ProjectStatus::Untracked);
    }

    #[test]
    fn test_cheap_outgoing_is_always_recomputed() {
        let (_temp_dir, cache) = setup_cache();
        cache
            .set(&outgoing_key("/src/project"), &Outgoing::Count(5))
            .unwrap();

        let repo = repo_with(&cache, FakeInspector::default());
        let info = repo.info(true).unwrap().unwrap();
        assert_eq!(info.outgoing, Outgoing::Count(0));
    }

    #[test]
    fn test_expensive_outgoing_uses_its_own_cache() {
        let (_temp_dir, cache) = setup_cache();
        cache
            .set(&outgoing_key("/src/project"), &Outgoing::AtLeastOne)
            .unwrap();

        let fake = FakeInspector {
            expensive: true,
            ..Default::default()
        };
        let calls = Rc::clone(&fake.calls);
        let repo = repo_with(&cache, fake);

        assert_eq!(repo.status(true).unwrap(), ProjectStatus::Unpushed);
        assert_eq!(calls.outgoing.get(), 0);
    }

    #[test]
    fn test_unknown_outgoing_falls_back_to_stale_value() {
        let (_temp_dir, cache) = setup_cache();
        cache
            .set("/src/project", &info(&[], &[], 0, Outgoing::AtLeastOne))
            .unwrap();

        let later = cache.clone().with_clock(std::sync::Arc::new(
            crate::core::clock::FixedClock::ahead_by(OUTGOING_EXPIRY * 2),
        ));
        let fake = FakeInspector {
            outgoing: Outgoing::Unknown,
            expensive: true,
            ..Default::default()
        };
        let repo = repo_with(&later, fake);

        let info = repo.info(true).unwrap().unwrap();
        assert_eq!(info.outgoing, Outgoing::AtLeastOne);
        // the transient result is not persisted
        assert_eq!(
            later.get::<Outgoing>(&outgoing_key("/src/project"), STALE_EXPIRY),
            None
        );
    }

    #[test]
    fn test_unknown_outgoing_falls_back_to_kept_outgoing_entry() {
        let (_temp_dir, cache) = setup_cache();
        let key = outgoing_key("/src/project");
        let repo = repo_with(&cache, FakeInspector::default());
        cache.set("/src/project", &info(&[], &[], 0, Outgoing::AtLeastOne)).unwrap();
        cache.set(&key, &Outgoing::AtLeastOne).unwrap();
        repo.clear_cache(true).unwrap();

        let later = cache.clone().with_clock(std::sync::Arc::new(
            crate::core::clock::FixedClock::ahead_by(OUTGOING_EXPIRY * 2),
        ));
        let fake = FakeInspector {
            outgoing: Outgoing::Unknown,
            expensive: true,
            ..Default::default()
        };
        let calls = Rc::clone(&fake.calls);
        let repo = repo_with(&later, fake);

        let info = repo.info(true).unwrap().unwrap();
        assert_eq!(info.outgoing, Outgoing::AtLeastOne);
        // the expired entry was rechecked, and survives the inconclusive result
        assert_eq!(calls.outgoing.get(), 1);
        assert_eq!(
            later.get::<Outgoing>(&key, STALE_EXPIRY),
            Some(Outgoing::AtLeastOne)
        );
    }

    #[test]
    fn test_unknown_outgoing_without_history_is_kept() {
        let (_temp_dir, cache) = setup_cache();
        let fake = FakeInspector {
            outgoing: Outgoing::Unknown,
            expensive: true,
            ..Default::default()
        };
        let repo = repo_with(&cache, fake);

        let info = repo.info(true).unwrap().unwrap();
        assert_eq!(info.outgoing, Outgoing::Unknown);
        assert_eq!(repo.status(true).unwrap(), ProjectStatus::Unpushed);
    }

    #[test]
    fn test_parse_failure_is_not_cached() {
        let (_temp_dir, cache) = setup_cache();
        let fake = FakeInspector {
            broken: true,
            ..Default::default()
        };
        let repo = repo_with(&cache, fake);

        let err = repo.status(true).unwrap_err();
        assert!(err.is_parse_error());
        assert_eq!(cache.get::<RepoInfo>("/src/project", STALE_EXPIRY), None);
    }

    #[test]
    fn test_clear_cache() {
        let (_temp_dir, cache) = setup_cache();
        let repo = repo_with(&cache, FakeInspector::default());
        repo.info(true).unwrap();
        cache
            .set(&outgoing_key("/src/project"), &Outgoing::Count(1))
            .unwrap();

        repo.clear_cache(true).unwrap();
        assert_eq!(cache.get::<RepoInfo>("/src/project", STALE_EXPIRY), None);
        assert!(cache
            .get::<Outgoing>(&outgoing_key("/src/project"), STALE_EXPIRY)
            .is_some());

        repo.clear_cache(false).unwrap();
        assert!(cache
            .get::<Outgoing>(&outgoing_key("/src/project"), STALE_EXPIRY)
            .is_none());
    }

    #[test]
    fn test_contains_path() {
        let temp_dir = TempDir::new().unwrap();
        let root = std::fs::canonicalize(temp_dir.path()).unwrap();
        let inner = root.join("src");
        std::fs::create_dir_all(&inner).unwrap();

        assert!(contains_path(&root, &inner));
        assert!(!contains_path(&inner, &root));
        // component-wise, not string prefix
        assert!(!contains_path(&root.join("sr"), &inner));
    }
}
