//! Core functionality for jerjerrod.
//!
//! This module provides the status-inspection and caching engine: the
//! result and ancestry caches, the git/hg inspectors, repos and workspaces,
//! config parsing and project enumeration, plus output formatting and the
//! background refresh used by the commands.

pub mod ancestry;
pub mod cache;
pub mod clock;
pub mod command_init;
pub mod config;
pub mod dirs;
pub mod enumerator;
pub mod error;
pub mod info;
pub mod inspector;
pub mod output;
pub mod process;
pub mod project;
pub mod refresh;
pub mod repo;
pub mod status;
pub mod workspace;

// === Error handling ===
pub use error::{ConfigError, JerjerrodError, ParseError, Result};

// === Caching ===
// Disk-backed TTL cache and the long-lived ancestry memo built on it
pub use ancestry::AncestryCache;
pub use cache::{ResultCache, OUTGOING_EXPIRY, PROJECT_EXPIRY};

// === Inspection ===
pub use info::{Outgoing, RepoInfo};
pub use inspector::{Backend, GitInspector, HgInspector, Inspector};
pub use status::ProjectStatus;

// === Projects ===
pub use project::Project;
pub use repo::Repo;
pub use workspace::Workspace;

// === Configuration ===
pub use command_init::CommandContext;
pub use config::{ConfigCache, Directive};
pub use enumerator::ProjectEnumerator;

// === Background refresh ===
pub use refresh::{RefreshMonitor, RefreshState, RefreshTask};

// === Output formatting ===
pub use output::{print_error, print_success, print_warning};
