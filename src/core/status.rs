//! Type-safe project status classification.
//!
//! [`ProjectStatus`] replaces the string identifiers used on the command line
//! and in scripts with an enumeration that also knows its severity, so
//! workspaces can pick the worst status among their repos.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Prefix accepted (and ignored) when parsing status names
pub const STATUS_PREFIX: &str = "JERJERROD:";

/// Project status, declared from most to least severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProjectStatus {
    /// No information could be obtained
    Unknown,
    /// Modified files or stashes
    Changed,
    /// Untracked files
    Untracked,
    /// Commits not present on any remote
    Unpushed,
    /// Workspace-only: unrecognised entries in the workspace directory
    Garbage,
    /// Nothing to report
    Clean,
}

impl ProjectStatus {
    /// Every status in severity order
    pub const ALL: [ProjectStatus; 6] = [
        ProjectStatus::Unknown,
        ProjectStatus::Changed,
        ProjectStatus::Untracked,
        ProjectStatus::Unpushed,
        ProjectStatus::Garbage,
        ProjectStatus::Clean,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Unknown => "UNKNOWN",
            ProjectStatus::Changed => "CHANGED",
            ProjectStatus::Untracked => "UNTRACKED",
            ProjectStatus::Unpushed => "UNPUSHED",
            ProjectStatus::Garbage => "GARBAGE",
            ProjectStatus::Clean => "CLEAN",
        }
    }

    /// The more severe of two statuses
    pub fn worst(self, other: ProjectStatus) -> ProjectStatus {
        self.min(other)
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.strip_prefix(STATUS_PREFIX).unwrap_or(s);
        ProjectStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| format!("unknown status '{s}'"))
    }
}
