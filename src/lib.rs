//! jerjerrod - at-a-glance status of many git and mercurial repositories.
//!
//! This library provides the engine behind the `jerjerrod` command: it
//! inspects working trees, classifies them (changed, untracked, unpushed,
//! clean), and caches the results on disk so that repeated queries from a
//! status line stay cheap.
//!
//! # Public API
//! The main public interface is re-exported from the [`core`] module:
//! - [`ResultCache`] and [`AncestryCache`] for cached results
//! - [`Inspector`] implementations for git and mercurial
//! - [`Repo`], [`Workspace`] and [`Project`] with their status queries
//! - [`ProjectEnumerator`] to build projects from `jerjerrod.conf`
//! - Error handling and result types

pub mod commands;
pub mod core;

// Re-export the core public API for external users
pub use core::{
    AncestryCache,
    Backend,
    CommandContext,
    ConfigCache,
    ConfigError,
    Directive,
    GitInspector,
    HgInspector,
    Inspector,
    // Error handling
    JerjerrodError,
    Outgoing,
    ParseError,
    Project,
    ProjectEnumerator,
    ProjectStatus,
    RefreshMonitor,
    Repo,
    RepoInfo,
    // Caching
    ResultCache,
    Result,
    Workspace,
};
