//! Inspection results as they are cached on disk.
//!
//! [`RepoInfo`] is the snapshot a [`crate::core::repo::Repo`] derives from its
//! inspector. [`Outgoing`] keeps the on-disk shape of the outgoing field: an
//! integer count, or one of the string flags `"1+"`, `"?"` and `"-"`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Whether a repository has commits that have not reached a remote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum Outgoing {
    /// An exact number of outgoing branches/commits (possibly 0)
    Count(u64),
    /// At least one outgoing change, exact amount unknown (`"1+"`)
    AtLeastOne,
    /// The check timed out; a transient state (`"?"`)
    Unknown,
    /// The remote could not be contacted (`"-"`)
    Unreachable,
}

impl Outgoing {
    pub fn as_flag(&self) -> Option<&'static str> {
        match self {
            Outgoing::Count(_) => None,
            Outgoing::AtLeastOne => Some("1+"),
            Outgoing::Unknown => Some("?"),
            Outgoing::Unreachable => Some("-"),
        }
    }

    /// Anything but a zero count counts as "has outgoing"
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Outgoing::Count(0))
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Outgoing::Unknown)
    }
}

impl fmt::Display for Outgoing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outgoing::Count(n) => write!(f, "{n}"),
            other => f.write_str(other.as_flag().unwrap_or_default()),
        }
    }
}

impl From<Outgoing> for Value {
    fn from(outgoing: Outgoing) -> Self {
        match outgoing {
            Outgoing::Count(n) => Value::from(n),
            other => Value::from(other.as_flag().unwrap_or_default()),
        }
    }
}

impl TryFrom<Value> for Outgoing {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match &value {
            Value::Number(n) => n
                .as_u64()
                .map(Outgoing::Count)
                .ok_or_else(|| format!("invalid outgoing count {n}")),
            Value::String(s) => match s.as_str() {
                "1+" => Ok(Outgoing::AtLeastOne),
                "?" => Ok(Outgoing::Unknown),
                "-" => Ok(Outgoing::Unreachable),
                "0" | "" => Ok(Outgoing::Count(0)),
                other => Err(format!("invalid outgoing flag {other:?}")),
            },
            other => Err(format!("invalid outgoing value {other}")),
        }
    }
}

/// Everything jerjerrod knows about one repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoInfo {
    pub branch: Option<String>,
    pub changed: Vec<String>,
    pub untracked: Vec<String>,
    pub outgoing: Outgoing,
    pub stashes: usize,
}
