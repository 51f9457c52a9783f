//! Git inspection.
//!
//! Working-tree state comes from `git status --short` and `git stash list`,
//! run in the repository's working directory. Branch, upstream and remote-ref
//! information comes from `git2`; the repository handle is opened per query
//! and dropped before the query returns.
//!
//! # Outgoing detection
//! A repo has outgoing commits when some local branch carries commits that no
//! remote-tracking ref already contains:
//! 1. branches with an upstream are outgoing unless their tip is the upstream
//!    tip or one of its ancestors;
//! 2. branches without one are collected by tip commit, dropped if a remote
//!    ref points at exactly that commit, and otherwise tested for ancestry
//!    against every remote ref (`origin/master`, `origin/main` and
//!    `origin/<branch>` first).
//!
//! Backup branches (names containing `.WIP`) are never considered. Ancestry
//! answers go through [`AncestryCache`].

use crate::core::{
    ancestry::AncestryCache,
    error::{ParseError, Result},
    info::Outgoing,
    inspector::{memoized, Inspector, StatusLines},
    process::command_lines,
};
use git2::{BranchType, ErrorCode, Oid, Repository};
use std::cell::OnceCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Branch names containing this marker are WIP backups
pub const BACKUP_MARKER: &str = ".WIP";

const STATUS_COMMAND: &str = "git status --short";
const CHANGED_CODES: &[char] = &['M', 'A', 'D', 'R', 'C', 'T', 'U', ' '];

pub fn is_backup_branch(name: &str) -> bool {
    name.contains(BACKUP_MARKER)
}

/// Classify `git status --short` lines by their two-letter status code
pub fn parse_status(lines: &[String]) -> std::result::Result<StatusLines, ParseError> {
    let mut status = StatusLines::default();

    for line in lines {
        let unexpected = || ParseError::new(STATUS_COMMAND, line.as_str());
        let code = line.get(..2).ok_or_else(unexpected)?;
        if line.get(2..3) != Some(" ") {
            return Err(unexpected());
        }
        let path = line.get(3..).filter(|p| !p.is_empty()).ok_or_else(unexpected)?;

        if code == "??" {
            status.untracked.push(path.to_string());
        } else if code != "  " && code.chars().all(|c| CHANGED_CODES.contains(&c)) {
            status.changed.push(path.to_string());
        } else {
            return Err(unexpected());
        }
    }

    Ok(status)
}

/// A remote-tracking branch and the commit it points at
#[derive(Debug, Clone, PartialEq, Eq)]
struct RemoteRef {
    name: String,
    tip: Oid,
}

pub struct GitInspector {
    path: PathBuf,
    ancestry: AncestryCache,
    status: OnceCell<StatusLines>,
}

impl GitInspector {
    pub fn new(path: impl AsRef<Path>, ancestry: AncestryCache) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            ancestry,
            status: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<Repository> {
        Ok(Repository::open(&self.path)?)
    }

    /// `ancestor == descendant`, or `ancestor` is reachable from `descendant`
    fn is_ancestor(&self, repo: &Repository, ancestor: Oid, descendant: Oid) -> Result<bool> {
        self.ancestry.is_ancestor(
            &self.path,
            &ancestor.to_string(),
            &descendant.to_string(),
            || Ok(ancestor == descendant || repo.graph_descendant_of(descendant, ancestor)?),
        )
    }

    fn remote_refs(&self, repo: &Repository) -> Result<Vec<RemoteRef>> {
        let mut refs = Vec::new();

        for entry in repo.branches(Some(BranchType::Remote))? {
            let (branch, _) = entry?;
            let Some(name) = branch.name()?.map(str::to_string) else {
                continue;
            };
            if name.ends_with("/HEAD") || is_backup_branch(&name) {
                continue;
            }
            // symbolic refs have no direct target
            if let Some(tip) = branch.get().target() {
                refs.push(RemoteRef { name, tip });
            }
        }

        Ok(refs)
    }

    /// Is `tip` contained in any remote ref? The likeliest refs are probed
    /// first; the answer is the same either way.
    fn is_published(
        &self,
        repo: &Repository,
        tip: Oid,
        branch_names: &[String],
        remotes: &[RemoteRef],
    ) -> Result<bool> {
        let mut priority = vec!["origin/master".to_string(), "origin/main".to_string()];
        priority.extend(branch_names.iter().map(|name| format!("origin/{name}")));

        let (mut likely, rest): (Vec<&RemoteRef>, Vec<&RemoteRef>) =
            remotes.iter().partition(|r| priority.contains(&r.name));
        likely.sort_by_key(|r| priority.iter().position(|p| *p == r.name));

        for remote in likely.into_iter().chain(rest) {
            if self.is_ancestor(repo, tip, remote.tip)? {
                log::debug!("{tip} is published via {}", remote.name);
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn count_outgoing(&self, repo: &Repository) -> Result<u64> {
        let mut outgoing = 0;
        let mut local_only: BTreeMap<Oid, Vec<String>> = BTreeMap::new();

        for entry in repo.branches(Some(BranchType::Local))? {
            let (branch, _) = entry?;
            let Some(name) = branch.name()?.map(str::to_string) else {
                log::debug!("Skipping branch with a non UTF-8 name");
                continue;
            };
            if is_backup_branch(&name) {
                continue;
            }
            let Some(tip) = branch.get().target() else {
                continue;
            };

            // a configured upstream whose ref is gone behaves like no upstream
            let upstream_tip = match branch.upstream() {
                Ok(upstream) => upstream.get().target(),
                Err(e) => {
                    if e.code() != ErrorCode::NotFound {
                        log::debug!("Ignoring upstream of {name}: {e}");
                    }
                    None
                }
            };

            match upstream_tip {
                Some(upstream_tip) => {
                    if tip != upstream_tip && !self.is_ancestor(repo, tip, upstream_tip)? {
                        log::debug!("Branch {name} is ahead of its upstream");
                        outgoing += 1;
                    }
                }
                None => local_only.entry(tip).or_default().push(name),
            }
        }

        if local_only.is_empty() {
            return Ok(outgoing);
        }

        let remotes = self.remote_refs(repo)?;
        local_only.retain(|tip, _| !remotes.iter().any(|r| r.tip == *tip));

        for (tip, names) in &local_only {
            if !self.is_published(repo, *tip, names, &remotes)? {
                log::debug!("Local branch(es) {} not on any remote", names.join(", "));
                outgoing += 1;
            }
        }

        Ok(outgoing)
    }
}

impl Inspector for GitInspector {
    fn branch(&self) -> Result<Option<String>> {
        let repo = self.open()?;

        let head = match repo.head() {
            Ok(head) => head,
            Err(e) if e.code() == ErrorCode::UnbornBranch => {
                // no commits yet: HEAD still names the branch
                return Ok(repo
                    .find_reference("HEAD")
                    .ok()
                    .and_then(|head| head.symbolic_target().map(str::to_string))
                    .map(|target| target.trim_start_matches("refs/heads/").to_string()));
            }
            Err(e) => {
                log::debug!("Could not read HEAD of {}: {e}", self.path.display());
                return Ok(None);
            }
        };

        if head.is_branch() {
            Ok(head.shorthand().map(str::to_string))
        } else {
            Ok(None)
        }
    }

    fn status_lines(&self) -> Result<&StatusLines> {
        memoized(&self.status, || {
            let lines = command_lines("git", &["status", "--short"], &self.path)?;
            Ok(parse_status(&lines)?)
        })
    }

    fn stash_count(&self) -> Result<usize> {
        Ok(command_lines("git", &["stash", "list"], &self.path)?.len())
    }

    fn outgoing(&self) -> Result<Outgoing> {
        let repo = self.open()?;
        Ok(Outgoing::Count(self.count_outgoing(&repo)?))
    }

    fn outgoing_expensive(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cache::ResultCache;
    use std::process::Command;
    use tempfile::TempDir;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn git(dir: &Path, args: &[&str]) {
        let output = Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .unwrap();
        assert!(output.status.success(), "git {args:?} failed: {output:?}");
    }

    fn setup_test_repo() -> (TempDir, GitInspector) {
        let temp_dir = TempDir::new().unwrap();
        let repo_path = temp_dir.path().join("repo");
        std::fs::create_dir_all(&repo_path).unwrap();

        git(&repo_path, &["init", "-b", "main"]);
        git(&repo_path, &["config", "user.name", "Test User"]);
        git(&repo_path, &["config", "user.email", "test@example.com"]);

        let cache = ResultCache::new(
            temp_dir.path().join("cache"),
            temp_dir.path().join("ignore.json"),
        );
        let inspector = GitInspector::new(&repo_path, AncestryCache::new(&cache));
        (temp_dir, inspector)
    }

    fn commit(dir: &Path, file: &str, content: &str) {
        std::fs::write(dir.join(file), content).unwrap();
        git(dir, &["add", file]);
        git(dir, &["commit", "-m", &format!("update {file}")]);
    }

    #[test]
    fn test_parse_status_classifies_codes() {
        let status = parse_status(&lines(&[
            " M src/lib.rs",
            "M  staged.rs",
            "AM new.rs",
            " D gone.rs",
            "R  old.rs -> new.rs",
            "UU conflict.rs",
            "?? scratch.txt",
            "?? build/",
        ]))
        .unwrap();

        assert_eq!(
            status.changed,
            lines(&[
                "src/lib.rs",
                "staged.rs",
                "new.rs",
                "gone.rs",
                "old.rs -> new.rs",
                "conflict.rs"
            ])
        );
        assert_eq!(status.untracked, lines(&["scratch.txt", "build/"]));
    }

    #[test]
    fn test_parse_status_rejects_unknown_codes() {
        let err = parse_status(&lines(&[" M fine.rs", "XY what.rs"])).unwrap_err();
        assert_eq!(err.line, "XY what.rs");
        assert_eq!(err.command, "git status --short");
    }

    #[test]
    fn test_parse_status_rejects_malformed_lines() {
        assert!(parse_status(&lines(&["M"])).is_err());
        assert!(parse_status(&lines(&["   spaces.rs"])).is_err());
        assert!(parse_status(&lines(&["!! ignored.rs"])).is_err());
    }

    #[test]
    fn test_backup_branch_names() {
        assert!(is_backup_branch("feature.WIP"));
        assert!(is_backup_branch("origin/feature.WIP"));
        assert!(!is_backup_branch("feature"));
    }

    #[test]
    fn test_branch_on_unborn_repo() {
        let (_temp_dir, inspector) = setup_test_repo();
        assert_eq!(inspector.branch().unwrap(), Some("main".to_string()));
    }

    #[test]
    fn test_branch_detached_is_none() {
        let (_temp_dir, inspector) = setup_test_repo();
        commit(inspector.path(), "a.txt", "one");
        commit(inspector.path(), "a.txt", "two");
        git(inspector.path(), &["checkout", "--detach", "HEAD~1"]);

        assert_eq!(inspector.branch().unwrap(), None);
    }

    #[test]
    fn test_status_lines_and_stashes() {
        let (_temp_dir, inspector) = setup_test_repo();
        commit(inspector.path(), "tracked.txt", "one");
        std::fs::write(inspector.path().join("tracked.txt"), "two").unwrap();
        std::fs::write(inspector.path().join("new.txt"), "new").unwrap();

        assert_eq!(inspector.changed().unwrap(), lines(&["tracked.txt"]));
        assert_eq!(inspector.untracked().unwrap(), lines(&["new.txt"]));
        assert_eq!(inspector.stash_count().unwrap(), 0);
    }

    #[test]
    fn test_status_lines_are_memoized() {
        let (_temp_dir, inspector) = setup_test_repo();
        commit(inspector.path(), "tracked.txt", "one");
        assert!(inspector.changed().unwrap().is_empty());

        // later changes are not seen by the same inspector
        std::fs::write(inspector.path().join("tracked.txt"), "two").unwrap();
        assert!(inspector.changed().unwrap().is_empty());
    }

    #[test]
    fn test_stash_count() {
        let (_temp_dir, inspector) = setup_test_repo();
        commit(inspector.path(), "tracked.txt", "one");
        std::fs::write(inspector.path().join("tracked.txt"), "two").unwrap();
        git(inspector.path(), &["stash"]);
        std::fs::write(inspector.path().join("tracked.txt"), "three").unwrap();
        git(inspector.path(), &["stash"]);

        assert_eq!(inspector.stash_count().unwrap(), 2);
    }

    #[test]
    fn test_outgoing_without_remotes() {
        let (_temp_dir, inspector) = setup_test_repo();
        commit(inspector.path(), "a.txt", "one");
        assert!(!inspector.outgoing_expensive());
        assert_eq!(inspector.outgoing().unwrap(), Outgoing::Count(1));
    }

    #[test]
    fn test_outgoing_ignores_backup_branches() {
        let (_temp_dir, inspector) = setup_test_repo();
        commit(inspector.path(), "a.txt", "one");
        git(inspector.path(), &["branch", "-m", "main.WIP"]);
        assert_eq!(inspector.outgoing().unwrap(), Outgoing::Count(0));
    }

    #[test]
    fn test_outgoing_deduplicates_local_only_tips() {
        let (_temp_dir, inspector) = setup_test_repo();
        commit(inspector.path(), "a.txt", "one");
        git(inspector.path(), &["branch", "copy"]);
        assert_eq!(inspector.outgoing().unwrap(), Outgoing::Count(1));
    }
}
